use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::session::SessionUser;
use crate::{AppState, error::AppError};

/// access_gate
///
/// Applied to the whole router. Resolves the session once, asks the gate for a
/// decision and either redirects or forwards the request with the resolved
/// `SessionUser` stored in its extensions for the `AuthUser` extractor.
///
/// A failing session resolver is logged and the request continues anonymously:
/// public pages still render, protected ones redirect to login.
pub async fn access_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = match state.sessions.resolve_session(request.headers()).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "session resolution failed, treating request as anonymous");
            None
        }
    };

    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);

    let decision = match state
        .gate
        .decide(&path, query.as_deref(), session.as_ref(), state.roles.as_ref())
        .await
    {
        Ok(decision) => decision,
        Err(e) => return AppError::from(e).into_response(),
    };

    if let Some(redirect) = state.gate.redirect(&decision) {
        tracing::debug!(?decision, %path, "access gate redirect");
        return redirect;
    }

    if let Some(user) = session {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// AuthUser
///
/// The signed-in identity for the current request. Only available behind the
/// `access_gate` layer, which performs the actual session resolution; handlers
/// on public paths that take `AuthUser` reject anonymous callers with 401.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl From<SessionUser> for AuthUser {
    fn from(user: SessionUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionUser>()
            .cloned()
            .map(AuthUser::from)
            .ok_or(AppError::Unauthorized)
    }
}
