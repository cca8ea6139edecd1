//! Unified error handling with Sentry integration.
//!
//! Every route handler returns `Result<T, AppError>`. The error decides the
//! HTTP status and a client-safe message; server-side faults are logged and
//! captured to Sentry with their full detail, which never reaches the caller.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::{ConflictKind, RepositoryError};

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// One or more required request fields are absent or blank.
    #[error("Missing required fields ({0}).")]
    MissingFields(String),

    /// A value failed validation or the body could not be decoded.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The request body exceeds the size limit.
    #[error("Request body too large.")]
    PayloadTooLarge,

    /// The email is already registered to another account.
    #[error("This email address is already registered.")]
    DuplicateEmail,

    /// The identifier is well-formed but no record has it.
    #[error("{0} not found.")]
    NotFound(&'static str),

    /// The identifier is not a valid store key.
    #[error("Invalid {0} ID format.")]
    MalformedId(&'static str),

    /// Login failed: unknown email, not an admin, or wrong password.
    #[error("Invalid credentials or not an admin.")]
    InvalidCredentials,

    /// The admin bootstrap has already been used.
    #[error("Admin user already exists. Setup blocked.")]
    AdminAlreadyExists,

    /// The record store failed.
    #[error("Store error: {0}")]
    Store(#[source] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::Validation(_) | Self::MalformedId(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AdminAlreadyExists => StatusCode::FORBIDDEN,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a server-side fault rather than a caller mistake.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}

/// Constraint violations become the matching client error; anything else
/// stays a store failure.
impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(ConflictKind::DuplicateEmail) => Self::DuplicateEmail,
            RepositoryError::Conflict(ConflictKind::AdminExists) => Self::AdminAlreadyExists,
            other => Self::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let message = if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
            "Internal server error".to_owned()
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { message })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
