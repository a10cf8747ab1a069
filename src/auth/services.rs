use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    if !is_valid_email(email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_password(state: &AppState, plain: String) -> AppResult<String> {
    let hasher = state.hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&plain))
        .await
        .map_err(|e| AppError::internal("Failed to process password", e))?
        .map_err(AppError::from)
}

async fn verify_password(state: &AppState, plain: String, hash: String) -> AppResult<bool> {
    let hasher = state.hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
        .await
        .map_err(|e| AppError::internal("Failed to process password", e))?
        .map_err(AppError::from)
}

pub async fn register(state: &AppState, payload: RegisterRequest) -> AppResult<AuthResponse> {
    let email = payload.email.trim().to_string();
    validate_credentials(&email, &payload.password)?;

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::Conflict("User with this email already exists".into()));
    }

    let hash = hash_password(state, payload.password).await?;
    // A concurrent registration can still win the race; the store reports it
    // as DuplicateEmail, which maps to the same 400.
    let user = state.users.create(&email, &hash).await?;
    let token = state.tokens.issue(user.id)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<AuthResponse> {
    let email = payload.email.trim().to_string();
    if !is_valid_email(&email) {
        warn!(%email, "invalid email");
        return Err(AppError::validation("Invalid email"));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(state, payload.password, user.password_hash.clone()).await? {
        warn!(%email, user_id = user.id, "login invalid password");
        return Err(invalid());
    }

    let token = state.tokens.issue(user.id)?;
    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}
