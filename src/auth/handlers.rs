use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
    extractors::CurrentUser,
    services,
};
use crate::{
    error::{AppError, AppResult},
    response::ApiSuccess,
    state::AppState,
};

/// Public routes: no token required.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that must sit behind the auth gate.
pub fn me_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me))
}

pub(crate) fn bad_body(rejection: JsonRejection) -> AppError {
    warn!(error = %rejection, "request body rejected");
    AppError::validation_with("Invalid request data", rejection.body_text())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> AppResult<ApiSuccess<AuthResponse>> {
    let Json(payload) = payload.map_err(bad_body)?;
    let auth = services::register(&state, payload).await?;
    Ok(ApiSuccess::created(auth).with_message("User registered successfully"))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<ApiSuccess<AuthResponse>> {
    let Json(payload) = payload.map_err(bad_body)?;
    let auth = services::login(&state, payload).await?;
    Ok(ApiSuccess::ok(auth).with_message("Login successful"))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    current: CurrentUser,
) -> AppResult<ApiSuccess<PublicUser>> {
    let user = state
        .users
        .find_by_id(current.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(ApiSuccess::ok(user.into()))
}
