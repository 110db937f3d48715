//! Route-level access decisions.
//!
//! The gate classifies every request path as public, protected (any signed-in
//! user) or admin-only, and decides whether to let the request through or
//! redirect it. It holds only immutable configuration.

use axum::response::{IntoResponse, Redirect, Response};
use regex::Regex;
use std::sync::Arc;

use super::{roles::RoleLookup, session::SessionUser};
use crate::{
    config::{AdminAllowlist, AppConfig},
    error::RepositoryError,
    models::RoleSlug,
};

/// Pages a signed-in user has no reason to visit.
pub const FORBIDDEN_WHEN_AUTHENTICATED: &[&str] = &["/auth/login", "/auth/register"];

/// Pages that require any signed-in user, in addition to everything under
/// `/account` and `/admin`.
pub const PROTECTED_ROUTES: &[&str] = &["/profile", "/bookmarks", "/dashboard"];

pub const ADMIN_PREFIX: &str = "/admin";
pub const ACCOUNT_PREFIX: &str = "/account";

/// RoutePolicy
///
/// Compiled route lists plus the redirect targets. Patterns are whole-path
/// matches: each one is anchored as `^(?:pattern)$`, so `/profile` does not match
/// `/profile/edit` unless the pattern says so.
#[derive(Debug)]
pub struct RoutePolicy {
    forbidden_when_authenticated: Vec<Regex>,
    protected: Vec<Regex>,
    admin_prefix: String,
    account_prefix: String,
    login_path: String,
    default_authenticated_path: String,
}

impl RoutePolicy {
    pub fn new(
        forbidden_when_authenticated: &[&str],
        protected: &[&str],
        login_path: impl Into<String>,
        default_authenticated_path: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            forbidden_when_authenticated: compile(forbidden_when_authenticated)?,
            protected: compile(protected)?,
            admin_prefix: ADMIN_PREFIX.to_string(),
            account_prefix: ACCOUNT_PREFIX.to_string(),
            login_path: login_path.into(),
            default_authenticated_path: default_authenticated_path.into(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, regex::Error> {
        Self::new(
            FORBIDDEN_WHEN_AUTHENTICATED,
            PROTECTED_ROUTES,
            config.login_path.clone(),
            config.default_authenticated_path.clone(),
        )
    }

    pub fn is_forbidden_when_authenticated(&self, path: &str) -> bool {
        self.forbidden_when_authenticated.iter().any(|re| re.is_match(path))
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|re| re.is_match(path))
    }

    // Literal prefix tests; `/administrator` counts as admin.
    pub fn is_admin(&self, path: &str) -> bool {
        path.starts_with(&self.admin_prefix)
    }

    pub fn is_account(&self, path: &str) -> bool {
        path.starts_with(&self.account_prefix)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn default_authenticated_path(&self) -> &str {
        &self.default_authenticated_path
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Regex>, regex::Error> {
    patterns
        .iter()
        .map(|pattern| Regex::new(&format!("^(?:{pattern})$")))
        .collect()
}

/// AccessDecision
///
/// Outcome of the gate for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectToDefaultAuthenticatedPage,
    RedirectToLogin,
    /// `callback_url` is the original path plus query string, not yet encoded.
    RedirectToLoginWithCallback { callback_url: String },
}

impl AccessDecision {
    /// The redirect target, or `None` for `Allow`.
    pub fn location(&self, policy: &RoutePolicy) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::RedirectToDefaultAuthenticatedPage => {
                Some(policy.default_authenticated_path().to_string())
            }
            Self::RedirectToLogin => Some(policy.login_path().to_string()),
            Self::RedirectToLoginWithCallback { callback_url } => {
                // A callback that is not a local path is dropped, not rejected.
                if callback_url.starts_with('/') {
                    Some(format!(
                        "{}?callbackUrl={}",
                        policy.login_path(),
                        urlencoding::encode(callback_url)
                    ))
                } else {
                    Some(policy.login_path().to_string())
                }
            }
        }
    }
}

/// AccessGate
///
/// Cheap to clone; the compiled policy and the allowlist are shared.
#[derive(Debug, Clone)]
pub struct AccessGate {
    policy: Arc<RoutePolicy>,
    allowlist: Arc<AdminAllowlist>,
}

impl AccessGate {
    pub fn new(policy: RoutePolicy, allowlist: AdminAllowlist) -> Self {
        Self {
            policy: Arc::new(policy),
            allowlist: Arc::new(allowlist),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, regex::Error> {
        Ok(Self::new(
            RoutePolicy::from_config(config)?,
            config.admin_allowlist.clone(),
        ))
    }

    pub fn policy(&self) -> &RoutePolicy {
        &self.policy
    }

    /// decide
    ///
    /// Rules, first match wins:
    /// 1. signed in + login/register page → default authenticated page
    /// 2. signed in + admin path → allowlist membership when an allowlist is
    ///    configured (roles are not fetched), otherwise the `admin` role;
    ///    failure → login
    /// 3. anonymous + protected, account or admin path → login with callback
    /// 4. allow
    ///
    /// Only a role-lookup failure produces an error.
    pub async fn decide(
        &self,
        path: &str,
        query: Option<&str>,
        session: Option<&SessionUser>,
        roles: &dyn RoleLookup,
    ) -> Result<AccessDecision, RepositoryError> {
        if let Some(user) = session {
            if self.policy.is_forbidden_when_authenticated(path) {
                return Ok(AccessDecision::RedirectToDefaultAuthenticatedPage);
            }

            if self.policy.is_admin(path) {
                let is_admin = if self.allowlist.is_configured() {
                    self.allowlist.contains(&user.email)
                } else {
                    roles.lookup_roles(user.id).await?.contains(&RoleSlug::Admin)
                };

                return Ok(if is_admin {
                    AccessDecision::Allow
                } else {
                    AccessDecision::RedirectToLogin
                });
            }

            return Ok(AccessDecision::Allow);
        }

        if self.policy.is_protected(path) || self.policy.is_account(path) || self.policy.is_admin(path)
        {
            let callback_url = match query.filter(|q| !q.is_empty()) {
                Some(q) => format!("{path}?{q}"),
                None => path.to_string(),
            };
            return Ok(AccessDecision::RedirectToLoginWithCallback { callback_url });
        }

        Ok(AccessDecision::Allow)
    }

    /// Converts a decision into a `307 Temporary Redirect`, or `None` for `Allow`.
    pub fn redirect(&self, decision: &AccessDecision) -> Option<Response> {
        decision
            .location(&self.policy)
            .map(|location| Redirect::temporary(&location).into_response())
    }
}
