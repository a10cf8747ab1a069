use crate::state::AppState;
use axum::Router;

pub mod dates;
mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

/// Student, group, schedule and attendance routes. All require a token.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
