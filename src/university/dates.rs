//! Visit-day normalization for attendance records.
//!
//! Input is matched against [`ACCEPTED_LAYOUTS`] in order and the first layout
//! that yields a real calendar date wins. Ambiguous strings such as
//! `03/04/2024` therefore resolve day-first, because `DD/MM/YYYY` precedes
//! `MM/DD/YYYY`. The result is always rendered as `DD.MM.YYYY`.

use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("unsupported date format: {0:?}")]
    UnsupportedDateFormat(String),
}

/// Layouts tried by [`normalize`], in precedence order.
pub const ACCEPTED_LAYOUTS: [(&str, &[FormatItem<'static>]); 6] = [
    ("DD.MM.YYYY", format_description!("[day].[month].[year]")),
    ("YYYY/MM/DD", format_description!("[year]/[month]/[day]")),
    ("DD-MM-YYYY", format_description!("[day]-[month]-[year]")),
    ("DD/MM/YYYY", format_description!("[day]/[month]/[year]")),
    ("MM/DD/YYYY", format_description!("[month]/[day]/[year]")),
    ("YYYY.MM.DD", format_description!("[year].[month].[day]")),
];

/// Every field is a run of ASCII digits between single separators. `[year]`
/// alone would also take a leading `+` or `-`.
fn unsigned_fields(input: &str) -> bool {
    input
        .split(|c: char| !c.is_ascii_digit())
        .all(|field| !field.is_empty())
}

/// Parses `input` with the first accepted layout that fits.
pub fn parse(input: &str) -> Result<Date, DateError> {
    let unsupported = || DateError::UnsupportedDateFormat(input.to_string());
    if !unsigned_fields(input) {
        return Err(unsupported());
    }
    ACCEPTED_LAYOUTS
        .iter()
        .find_map(|(_, layout)| Date::parse(input, layout).ok())
        .filter(|date| (1..=9999).contains(&date.year()))
        .ok_or_else(unsupported)
}

/// Canonical `DD.MM.YYYY` rendering.
pub fn canonical(date: Date) -> String {
    format!(
        "{:02}.{:02}.{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

pub fn normalize(input: &str) -> Result<String, DateError> {
    parse(input).map(canonical)
}
