use crate::{AppState, handlers::auth};
use axum::{
    Router,
    routing::{get, post},
};

/// Auth Router Module
///
/// Credentials are never checked here; `login` and `register_user` forward them
/// to the auth provider and only keep the resulting identity.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        // GET/POST /auth/login?callbackUrl=/account
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/register", post(auth::register_user))
        .route("/auth/logout", post(auth::logout))
}
