use crate::{AppState, handlers::admin};
use axum::{
    Router,
    routing::{delete, get, put},
};

/// Admin Router Module
///
/// Content, monetization and user management. Nothing in here checks roles
/// itself: by the time a request is routed, the gate has already required an
/// allowlisted email or the `admin` role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Dashboard counters.
        .route("/", get(admin::get_dashboard))
        // --- Posts ---
        .route("/posts", get(admin::list_posts).post(admin::create_post))
        .route(
            "/posts/{id}",
            put(admin::update_post).delete(admin::delete_post),
        )
        // PUT /admin/posts/{id}/published  body: true | false
        .route("/posts/{id}/published", put(admin::set_post_published))
        // --- Monetization ---
        .route("/advertisements", get(admin::list_ads).post(admin::create_ad))
        .route("/advertisements/{id}", delete(admin::delete_ad))
        .route("/advertisements/{id}/active", put(admin::set_ad_active))
        .route(
            "/affiliate-links",
            get(admin::list_affiliate_links).post(admin::create_affiliate_link),
        )
        .route("/affiliate-links/{id}", delete(admin::delete_affiliate_link))
        // --- Users & Roles ---
        .route("/users", get(admin::list_users))
        .route("/roles", get(admin::list_roles))
        .route(
            "/users/{user_id}/roles",
            get(admin::get_user_roles).post(admin::assign_role),
        )
        .route("/users/{user_id}/roles/{role}", delete(admin::revoke_role))
        // --- Moderation ---
        .route("/comments/{id}", delete(admin::delete_comment))
        // --- Reader Engagement ---
        .route("/contact-messages", get(admin::list_contact_messages))
        .route("/contact-messages/{id}", delete(admin::delete_contact_message))
        .route("/rum", get(admin::rum_summary))
}
