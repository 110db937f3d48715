use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, SessionError},
};

/// ProviderUser
///
/// The user object returned by the provider's sign-up and user endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<String>,
}

/// Sign-up returns either the bare user (confirmation pending) or a session
/// wrapping it (auto-confirm enabled).
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    WithSession { user: ProviderUser },
    Bare(ProviderUser),
}

/// TokenGrant
///
/// Result of a successful password grant. GoTrue includes the signed-in user.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub user: Option<ProviderUser>,
}

/// AuthProviderClient
///
/// Thin client for the external auth provider (GoTrue-compatible REST API). The
/// provider owns passwords and sessions; this application only forwards
/// credentials and reads back identities.
#[derive(Clone)]
pub struct AuthProviderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthProviderClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.auth_provider_url.trim_end_matches('/').to_string(),
            api_key: config.auth_provider_key.clone(),
        }
    }

    /// Creates the provider account. A provider rejection (duplicate email, weak
    /// password) maps to 400.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<ProviderUser, AppError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::AuthProvider(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AppError::BadRequest("registration rejected".to_string()));
        }
        if !status.is_success() {
            return Err(AppError::AuthProvider(format!("sign-up returned {status}")));
        }

        match response
            .json::<SignUpResponse>()
            .await
            .map_err(|e| AppError::AuthProvider(e.to_string()))?
        {
            SignUpResponse::WithSession { user } | SignUpResponse::Bare(user) => Ok(user),
        }
    }

    /// Exchanges email/password for an access token. Wrong credentials map to 401.
    pub async fn password_grant(&self, email: &str, password: &str) -> Result<TokenGrant, AppError> {
        let response = self
            .client
            .post(format!("{}/auth/v1/token?grant_type=password", self.base_url))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::AuthProvider(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AppError::AuthProvider(format!("token grant returned {status}")));
        }

        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| AppError::AuthProvider(e.to_string()))
    }

    /// fetch_user
    ///
    /// Resolves an access token to its owner. 401/403 from the provider mean the
    /// token is not (or no longer) valid and yield `Ok(None)`.
    pub async fn fetch_user(&self, token: &str) -> Result<Option<ProviderUser>, SessionError> {
        let response = self
            .client
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json::<ProviderUser>().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            status => Err(SessionError::ProviderStatus(status.as_u16())),
        }
    }
}
