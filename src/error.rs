use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::{
    auth::{jwt::TokenError, password::HashingError},
    db::StoreError,
    response::Envelope,
    university::dates::DateError,
};

/// Request-level failure, rendered as an error envelope.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range client input.
    #[error("{message}")]
    Validation {
        message: String,
        detail: Option<String>,
    },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate registration. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(String),

    /// Store or hashing failure. `source` is logged, never sent to the client.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            detail: None,
        }
    }

    pub fn validation_with(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Validation {
            message: message.into(),
            detail: Some(detail.to_string()),
        }
    }

    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation { message, detail } => Envelope::error(message, detail),
            AppError::Unauthorized(message)
            | AppError::NotFound(message)
            | AppError::Conflict(message) => Envelope::error(message, None),
            AppError::Internal { message, source } => {
                error!(error = ?source, %message, "request failed");
                Envelope::error(message, None)
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AppError::Conflict("Email already registered".into()),
            StoreError::MissingReference => {
                AppError::validation("Referenced student or schedule does not exist")
            }
            StoreError::Database(e) => AppError::internal("Internal server error", e),
        }
    }
}

impl From<HashingError> for AppError {
    fn from(e: HashingError) -> Self {
        AppError::internal("Failed to process password", e)
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Signing(_) => AppError::internal("Failed to issue token", e),
            _ => AppError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

impl From<DateError> for AppError {
    fn from(e: DateError) -> Self {
        AppError::validation_with("Invalid date format. Use DD.MM.YYYY", e)
    }
}
