use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod feeds;
pub mod handlers;
pub mod models;
pub mod repository;

// Routers grouped by audience (public, auth, account, admin).
pub mod routes;
use routes::{account, admin, public};

// --- Public Re-exports ---

pub use auth::{AccessGate, AuthProviderClient, RoleLookupState, SessionResolverState};
pub use config::AppConfig;
pub use error::AppError;
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every annotated handler, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login_page, handlers::auth::login, handlers::auth::logout,
        handlers::auth::register_user,
        handlers::blog::list_posts, handlers::blog::get_post, handlers::blog::list_post_comments,
        handlers::blog::list_active_ads, handlers::blog::follow_affiliate_link,
        handlers::blog::rss_feed, handlers::blog::sitemap,
        handlers::account::get_account, handlers::account::get_profile,
        handlers::account::update_profile, handlers::account::list_bookmarks,
        handlers::account::add_bookmark, handlers::account::remove_bookmark,
        handlers::account::add_comment, handlers::account::delete_comment,
        handlers::admin::get_dashboard, handlers::admin::list_posts, handlers::admin::create_post,
        handlers::admin::update_post, handlers::admin::set_post_published,
        handlers::admin::delete_post, handlers::admin::list_ads, handlers::admin::create_ad,
        handlers::admin::set_ad_active, handlers::admin::delete_ad,
        handlers::admin::list_affiliate_links, handlers::admin::create_affiliate_link,
        handlers::admin::delete_affiliate_link, handlers::admin::list_users,
        handlers::admin::list_roles, handlers::admin::get_user_roles,
        handlers::admin::assign_role, handlers::admin::revoke_role,
        handlers::admin::delete_comment, handlers::admin::list_contact_messages,
        handlers::admin::delete_contact_message, handlers::admin::rum_summary,
        handlers::engagement::submit_contact, handlers::engagement::subscribe_newsletter,
        handlers::engagement::record_rum_metric,
    ),
    components(
        schemas(
            models::User, models::Role, models::RoleSlug, models::Post, models::Comment,
            models::Advertisement, models::AffiliateLink, models::RegisterUserRequest,
            models::LoginRequest, models::UpdateProfileRequest, models::CreatePostRequest,
            models::UpdatePostRequest, models::CreateCommentRequest,
            models::CreateAdvertisementRequest, models::CreateAffiliateLinkRequest,
            models::AssignRoleRequest, models::AdminDashboardStats, models::UserProfile,
            models::AccountOverview, models::ContactMessage, models::ContactRequest,
            models::NewsletterSubscribeRequest, models::RumMetric, models::RumMetricRequest,
            models::RumMetricSummary, handlers::auth::LoginPage,
        )
    ),
    tags(
        (name = "blog-platform", description = "Blog, account and admin API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request may need, shared by cheap clones. The three auth
/// collaborators are trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    /// Who is calling.
    pub sessions: SessionResolverState,
    /// What roles they hold.
    pub roles: RoleLookupState,
    /// Route classification and the allow/redirect decision.
    pub gate: AccessGate,
    /// Sign-up and password grant against the external auth provider.
    pub provider: AuthProviderClient,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles all routers behind a single `access_gate` layer, then wraps the
/// result in the request-id, tracing and CORS layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(routes::auth::auth_routes())
        .nest("/account", account::account_routes())
        .nest("/admin", admin::admin_routes())
        // Every path is classified by the gate before its handler runs.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::access_gate,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request carrying the `x-request-id` so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
