use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use super::extractors::CurrentUser;
use crate::{error::AppError, state::AppState};

/// Auth gate for protected routes.
///
/// Header present, `Bearer <token>` shape, token valid: only then is the
/// wrapped handler run, with a [`CurrentUser`] in the request extensions.
/// Any failed step answers 401 immediately.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())?;

    let claims = state.tokens.validate(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        AppError::from(e)
    })?;

    req.extensions_mut().insert(CurrentUser {
        user_id: claims.sub,
    });
    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let raw = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("Authorization header required".into()))?;

    let invalid_format = || {
        AppError::Unauthorized("Invalid authorization format. Use Bearer <token>".into())
    };

    let value = raw.to_str().map_err(|_| invalid_format())?;
    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.is_empty() && !token.contains(' ') => Ok(token),
        _ => Err(invalid_format()),
    }
}
