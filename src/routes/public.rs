use crate::{
    AppState,
    handlers::{blog, engagement},
};
use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

/// Public Router Module
///
/// Read endpoints plus the anonymous write-only forms (contact, newsletter,
/// RUM). Drafts never leave the repository through these handlers; every post
/// query filters on `published`.
///
/// `/profile`, `/bookmarks` and `/dashboard` are kept as short links into the
/// account area. The gate sends anonymous visitors on these paths to login
/// with a callback, so only signed-in users ever follow the redirects below.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for the load balancer.
        .route("/health", get(|| async { "ok" }))
        .route("/", get(|| async { Redirect::to("/blog") }))
        // GET /blog?tag=...&search=...&page=...&per_page=...
        .route("/blog", get(blog::list_posts))
        .route("/blog/{slug}", get(blog::get_post))
        .route("/blog/{slug}/comments", get(blog::list_post_comments))
        // GET /ads?placement=sidebar
        .route("/ads", get(blog::list_active_ads))
        // GET /go/{slug}
        // Counts the click, then 307s to the partner URL.
        .route("/go/{slug}", get(blog::follow_affiliate_link))
        .route("/rss.xml", get(blog::rss_feed))
        .route("/sitemap.xml", get(blog::sitemap))
        // --- Engagement (write-only) ---
        .route("/contact", post(engagement::submit_contact))
        .route("/newsletter", post(engagement::subscribe_newsletter))
        // POST /rum  body: { name: "LCP", value: 1234.5, path: "/blog/x" }
        .route("/rum", post(engagement::record_rum_metric))
        // --- Short links (protected) ---
        .route("/profile", get(|| async { Redirect::to("/account/profile") }))
        .route("/bookmarks", get(|| async { Redirect::to("/account/bookmarks") }))
        .route("/dashboard", get(|| async { Redirect::to("/account") }))
}
