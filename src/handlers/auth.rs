use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    AppState,
    auth::session::SESSION_COOKIE,
    config::{AppConfig, Env},
    error::AppError,
    models::{LoginRequest, NewUser, RegisterUserRequest, RoleSlug, User},
};

/// Fallback cookie lifetime when the provider omits `expires_in`.
const DEFAULT_SESSION_SECONDS: i64 = 3600;

/// LoginQuery
///
/// `callbackUrl` is set by the access gate when it bounced an anonymous visitor.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginPage {
    pub login_path: String,
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

/// sanitize_callback
///
/// Keeps only same-origin relative paths. Protocol-relative (`//host`) and
/// backslash tricks are dropped so the login flow can't be used as an open redirect.
pub fn sanitize_callback(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.starts_with('/') && !raw.starts_with("//") && !raw.contains('\\') {
        Some(raw.to_string())
    } else {
        None
    }
}

/// Builds the `Set-Cookie` value for a fresh session.
pub fn session_cookie(config: &AppConfig, token: &str, max_age: i64) -> String {
    let secure = if config.env == Env::Production { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
}

/// Builds the `Set-Cookie` value that removes the session cookie.
pub fn cleared_session_cookie(config: &AppConfig) -> String {
    session_cookie(config, "", 0)
}

/// login_page
///
/// [Public Route] Describes the login form. Signed-in users never reach this
/// handler; the access gate sends them to the default authenticated page.
#[utoipa::path(
    get,
    path = "/auth/login",
    params(LoginQuery),
    responses((status = 200, description = "Login form descriptor", body = LoginPage))
)]
pub async fn login_page(
    State(config): State<AppConfig>,
    Query(query): Query<LoginQuery>,
) -> Json<LoginPage> {
    Json(LoginPage {
        login_path: config.login_path.clone(),
        callback_url: sanitize_callback(query.callback_url.as_deref()),
    })
}

/// login
///
/// [Public Route] Forwards the credentials to the auth provider's password grant,
/// makes sure the user has a local mirror row, stores the returned access token
/// in an HttpOnly cookie and redirects to the callback (or the default
/// authenticated page).
#[utoipa::path(
    post,
    path = "/auth/login",
    params(LoginQuery),
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Signed in, redirecting"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = payload.email.trim().to_lowercase();
    let grant = state.provider.password_grant(&email, &payload.password).await?;

    // Accounts created at the provider directly get their local row here.
    if let Some(user) = &grant.user {
        let mirror_email = user.email.as_deref().unwrap_or(&email);
        state.repo.ensure_user(user.id, mirror_email).await?;
    }

    let max_age = grant.expires_in.unwrap_or(DEFAULT_SESSION_SECONDS);
    let cookie = session_cookie(&state.config, &grant.access_token, max_age);
    let target = sanitize_callback(query.callback_url.as_deref())
        .unwrap_or_else(|| state.config.default_authenticated_path.clone());

    tracing::info!("user signed in");

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie)]),
        Redirect::to(&target),
    )
        .into_response())
}

/// logout
///
/// [Public Route] Clears the session cookie. The provider-side session simply
/// expires; the application never mutates it.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 303, description = "Signed out"))
)]
pub async fn logout(State(config): State<AppConfig>) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, cleared_session_cookie(&config))]),
        Redirect::to("/"),
    )
        .into_response()
}

/// register_user
///
/// [Public Route] Creates the account with the auth provider, then mirrors it in
/// the local `users` table and grants the baseline `user` role. The password is
/// only passed through to the provider.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Rejected by the auth provider")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest("invalid email address".to_string()));
    }

    // Step 1: external auth provider owns the credentials.
    let provider_user = state.provider.sign_up(&email, &payload.password).await?;

    // Step 2: local mirror keyed by the provider's id.
    let user = state
        .repo
        .create_user(NewUser {
            id: provider_user.id,
            email: provider_user.email.unwrap_or(email),
            name: payload.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            email_verified: provider_user.email_confirmed_at.is_some(),
        })
        .await?;

    state.repo.assign_role(user.id, RoleSlug::User).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}
