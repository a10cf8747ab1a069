use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Student {
    pub student_id: i32,
    pub name: String,
    pub surname: String,
    pub gender: String,
    #[serde(with = "iso_date")]
    pub birthday: Date,
    pub group_id: i32,
}

#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Group {
    #[serde(rename = "id")]
    pub group_id: i32,
    #[serde(rename = "name")]
    pub group_name: String,
    #[serde(rename = "department")]
    pub faculty: String,
}

/// One lesson slot. Read-only from the API's perspective.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub group_id: i32,
    pub subject: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

/// Upsert payload, keyed by (student, schedule, visit day).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub student_id: i32,
    pub schedule_id: i32,
    /// Canonical `DD.MM.YYYY`.
    pub visit_day: String,
    pub visited: bool,
}

/// Attendance joined with student and group, for one schedule slot.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct AttendanceBySubject {
    pub student_id: i32,
    pub student_name: String,
    pub student_surname: String,
    pub group_name: String,
    pub visit_day: String,
    pub visited: bool,
}

/// Attendance joined with the schedule slot, for one student.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct AttendanceByStudent {
    pub subject_id: i32,
    pub subject_name: String,
    pub visit_day: String,
    pub visited: bool,
}
