use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity & Roles ---

/// User
///
/// The application's mirror of an auth-provider account, stored in `public.users`.
/// Identity (id, email, verification) is owned by the provider; `name` and
/// `newsletter_opt_in` are the profile fields the application may edit.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
    pub newsletter_opt_in: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// NewUser
///
/// Values needed to create the local mirror right after provider sign-up.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub email_verified: bool,
}

/// Role
///
/// Static reference row from `public.roles`, seeded by migration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Role {
    pub id: i32,
    pub slug: String,
    pub name: String,
}

/// RoleSlug
///
/// The stable identifiers a role row may carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum RoleSlug {
    Admin,
    Editor,
    Author,
    Moderator,
    User,
}

impl RoleSlug {
    pub const ALL: [RoleSlug; 5] = [
        RoleSlug::Admin,
        RoleSlug::Editor,
        RoleSlug::Author,
        RoleSlug::Moderator,
        RoleSlug::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleSlug::Admin => "admin",
            RoleSlug::Editor => "editor",
            RoleSlug::Author => "author",
            RoleSlug::Moderator => "moderator",
            RoleSlug::User => "user",
        }
    }
}

impl fmt::Display for RoleSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoleSlug::ALL
            .into_iter()
            .find(|slug| slug.as_str() == s)
            .ok_or_else(|| format!("unknown role slug: {s}"))
    }
}

// --- Blog Content ---

/// Post
///
/// A blog article from `public.posts`. Only rows with `published = true` are
/// visible on public routes, feeds and the sitemap.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub tags: Vec<String>,
    pub author_id: Uuid,
    pub published: bool,
    #[ts(type = "string | null")]
    pub published_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Comment
///
/// A reader comment, joined with the author's display name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    pub id: i64,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[sqlx(default)]
    pub author_name: Option<String>,
}

// --- Monetisation ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Advertisement {
    pub id: Uuid,
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    /// Where the ad is rendered, e.g. "sidebar" or "in-article".
    pub placement: String,
    pub active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// AffiliateLink
///
/// Short link served at `/go/{slug}`. `clicks` is incremented on every redirect.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AffiliateLink {
    pub id: Uuid,
    pub slug: String,
    pub destination_url: String,
    pub description: Option<String>,
    pub clicks: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

// --- Reader Engagement ---

/// ContactMessage
///
/// A stored contact-form submission, read back on the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// RumMetric
///
/// One real-user-monitoring sample (a Web Vitals measurement) reported by a browser.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RumMetric {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub path: String,
    pub rating: Option<String>,
    #[ts(type = "string")]
    pub recorded_at: DateTime<Utc>,
}

/// RumMetricSummary
///
/// Per-metric aggregate over the stored samples.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct RumMetricSummary {
    pub name: String,
    pub samples: i64,
    pub average: f64,
}

// --- Request Payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// LoginRequest
///
/// Credentials forwarded to the auth provider's password grant. Never logged or persisted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newsletter_opt_in: Option<bool>,
}

/// CreatePostRequest
///
/// When `slug` is omitted it is derived from the title.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub publish: bool,
}

/// UpdatePostRequest
///
/// Partial update; only provided fields are written (`COALESCE` in the query).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub post_id: Uuid,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAdvertisementRequest {
    pub title: String,
    pub image_url: String,
    pub target_url: String,
    pub placement: String,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAffiliateLinkRequest {
    pub slug: String,
    pub destination_url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AssignRoleRequest {
    pub role: RoleSlug,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub message: String,
}

/// RumMetricRequest
///
/// Body of `POST /rum`. `name` is a Web Vitals metric (`LCP`, `CLS`, ...).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RumMetricRequest {
    pub name: String,
    pub value: f64,
    pub path: String,
    #[serde(default)]
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewsletterSubscribeRequest {
    pub email: String,
}

// --- Dashboard & Profile Schemas (Output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminDashboardStats {
    pub total_posts: i64,
    pub published_posts: i64,
    pub total_users: i64,
    pub total_comments: i64,
    pub active_ads: i64,
    pub affiliate_clicks: i64,
}

/// UserProfile
///
/// Output schema for `/account/profile`: the stored user plus their role slugs.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub newsletter_opt_in: bool,
    pub roles: Vec<RoleSlug>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AccountOverview {
    pub profile: UserProfile,
    pub bookmark_count: i64,
}

/// slugify
///
/// Lowercases, keeps ASCII alphanumerics and collapses every other run of
/// characters into a single hyphen.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// True for non-empty slugs made of lowercase ASCII alphanumerics and single inner hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// Basic email validation: something before the `@`, a dotted domain after it.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
