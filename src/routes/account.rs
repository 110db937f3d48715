use crate::{AppState, handlers::account};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Account Router Module
///
/// Every handler takes `AuthUser` and only ever touches rows owned by that
/// user; the one exception is comment deletion by moderators.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::get_account))
        .route(
            "/profile",
            get(account::get_profile).put(account::update_profile),
        )
        .route("/bookmarks", get(account::list_bookmarks))
        // POST is idempotent: 201 on first bookmark, 200 afterwards.
        .route(
            "/bookmarks/{post_id}",
            post(account::add_bookmark).delete(account::remove_bookmark),
        )
        .route("/comments", post(account::add_comment))
        .route("/comments/{id}", delete(account::delete_comment))
}
