use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::provider::AuthProviderClient;
use crate::{
    config::{AppConfig, Env},
    error::SessionError,
    repository::RepositoryState,
};

/// Name of the cookie carrying the provider-issued access token.
pub const SESSION_COOKIE: &str = "session_token";

/// Header accepted in `Env::Local` to impersonate an existing user.
pub const LOCAL_BYPASS_HEADER: &str = "x-user-id";

/// Claims
///
/// The subset of the auth provider's JWT payload the application relies on.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the provider's user id, which is also `users.id` locally.
    pub sub: Uuid,
    #[serde(default)]
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

/// SessionUser
///
/// The identity a session resolves to. Opaque beyond id and email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
}

/// SessionResolver
///
/// Turns inbound request headers into an identity. `Ok(None)` means "no valid
/// session" (missing, malformed, expired or revoked token). `Err` is reserved for
/// infrastructure failures, which callers treat as unauthenticated.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError>;
}

pub type SessionResolverState = Arc<dyn SessionResolver>;

/// session_token
///
/// Extracts the access token, preferring `Authorization: Bearer` over the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    bearer.or_else(|| cookie_value(headers, SESSION_COOKIE))
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// JwtSessionResolver
///
/// Verifies the provider-signed JWT in-process with the shared secret.
///
/// 1. Local bypass: in `Env::Local`, an `x-user-id` header naming an existing user
///    is accepted without a token.
/// 2. Token extraction from the bearer header or the session cookie.
/// 3. Signature and expiry validation.
pub struct JwtSessionResolver {
    env: Env,
    decoding_key: DecodingKey,
    repo: RepositoryState,
}

impl JwtSessionResolver {
    pub fn new(config: &AppConfig, repo: RepositoryState) -> Self {
        Self {
            env: config.env.clone(),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            repo,
        }
    }

    async fn local_bypass(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError> {
        let Some(user_id) = headers
            .get(LOCAL_BYPASS_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
        else {
            return Ok(None);
        };

        Ok(self.repo.get_user(user_id).await?.map(|user| SessionUser {
            id: user.id,
            email: user.email,
        }))
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError> {
        if self.env == Env::Local {
            if let Some(user) = self.local_bypass(headers).await? {
                return Ok(Some(user));
            }
        }

        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.validate_aud = false;

        match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(Some(SessionUser {
                id: data.claims.sub,
                email: data.claims.email,
            })),
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("session token expired"),
                    other => tracing::debug!(?other, "session token rejected"),
                }
                Ok(None)
            }
        }
    }
}

/// RemoteSessionResolver
///
/// Asks the auth provider who owns the token on every request. Picks up
/// revocations immediately at the cost of one network round trip.
pub struct RemoteSessionResolver {
    provider: AuthProviderClient,
}

impl RemoteSessionResolver {
    pub fn new(provider: AuthProviderClient) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl SessionResolver for RemoteSessionResolver {
    async fn resolve_session(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };

        Ok(self.provider.fetch_user(token).await?.map(|user| SessionUser {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }))
    }
}
