use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod repo;
pub mod repo_types;
mod services;

/// Registration and login; reachable without a token.
pub fn public_router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Identity routes; callers must wrap them in [`middleware::require_auth`].
pub fn protected_router() -> Router<AppState> {
    handlers::me_routes()
}
