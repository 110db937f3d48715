//! Route handlers, grouped by the audience of the routes that use them.

pub mod account;
pub mod admin;
pub mod auth;
pub mod blog;
pub mod engagement;

use crate::{AppState, auth::AuthUser, error::AppError, models::User};

/// Returns the local `users` row for the signed-in user, creating a bare one
/// when the provider issued the session without a prior `/auth/register`.
/// Call before anything that reads the row or writes a row referencing it.
pub(crate) async fn ensure_local_user(state: &AppState, user: &AuthUser) -> Result<User, AppError> {
    Ok(state.repo.ensure_user(user.id, &user.email).await?)
}

/// Rejects anything that is not an absolute http(s) URL.
pub(crate) fn require_http_url(field: &str, value: &str) -> Result<(), AppError> {
    let value = value.trim();
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("{field} must be an http(s) URL")))
    }
}

/// Trims and rejects empty input.
pub(crate) fn require_text(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::BadRequest(format!("{field} must not be empty")))
    } else {
        Ok(trimmed.to_string())
    }
}
