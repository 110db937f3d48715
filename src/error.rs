//! Error types shared by the repository, the session resolver and the handlers.
//!
//! Handlers return `Result<T, AppError>`; server-side failures are logged and
//! reported to the client without internal details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure inside the persistence layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A unique constraint rejected the write (e.g. a duplicate slug).
    #[error("{0} already exists")]
    Conflict(String),
}

impl RepositoryError {
    /// Maps unique-constraint violations to `Conflict`, everything else to `Database`.
    pub fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Conflict(what.to_string()),
            _ => Self::Database(err),
        }
    }
}

/// Failure while resolving a session. Invalid or expired tokens are *not* errors;
/// they resolve to "no session".
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("auth provider request failed: {0}")]
    Provider(#[from] reqwest::Error),

    #[error("auth provider returned status {0}")]
    ProviderStatus(u16),

    #[error("user lookup failed: {0}")]
    Repository(#[from] RepositoryError),
}

/// Application-level error type returned by route handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("auth provider error: {0}")]
    AuthProvider(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AuthProvider(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(err @ RepositoryError::Conflict(_)) => err.to_string(),
            Self::Repository(_) => {
                tracing::error!(error = %self, "Request failed");
                "Internal server error".to_string()
            }
            Self::AuthProvider(_) => {
                tracing::error!(error = %self, "Auth provider failure");
                "Authentication service unavailable".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
