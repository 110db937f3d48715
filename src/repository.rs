use crate::auth::roles::RoleLookup;
use crate::error::RepositoryError;
use crate::models::{
    AdminDashboardStats, Advertisement, AffiliateLink, Comment, ContactMessage, ContactRequest,
    CreateAdvertisementRequest, CreateAffiliateLinkRequest, CreatePostRequest, NewUser, Post,
    Role, RoleSlug, RumMetric, RumMetricRequest, RumMetricSummary, UpdatePostRequest,
    UpdateProfileRequest, User,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// PostQuery
///
/// Filter and paging for the public post listing. `limit`/`offset` are already
/// clamped by the caller.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub tag: Option<String>,
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Repository Trait
///
/// Abstract contract for all persistence operations, so handlers never depend on
/// Postgres directly and tests can substitute an in-memory implementation.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    // Inserts a bare mirror row for a provider identity unless one exists.
    // Existing rows are returned untouched.
    async fn ensure_user(&self, id: Uuid, email: &str) -> RepoResult<User>;
    // Only provided fields are written.
    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> RepoResult<Option<User>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;

    // --- Roles ---
    async fn list_roles(&self) -> RepoResult<Vec<Role>>;
    // Idempotent: returns true only when a new assignment row was inserted.
    async fn assign_role(&self, user_id: Uuid, role: RoleSlug) -> RepoResult<bool>;
    async fn revoke_role(&self, user_id: Uuid, role: RoleSlug) -> RepoResult<bool>;

    // --- Posts ---
    // Public listing. Must enforce published = true.
    async fn list_published_posts(&self, query: PostQuery) -> RepoResult<Vec<Post>>;
    async fn get_published_post(&self, slug: &str) -> RepoResult<Option<Post>>;
    // Admin access: no visibility filter.
    async fn list_all_posts(&self) -> RepoResult<Vec<Post>>;
    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>>;
    async fn create_post(&self, author_id: Uuid, slug: String, req: CreatePostRequest) -> RepoResult<Post>;
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>>;
    async fn set_post_published(&self, id: Uuid, published: bool) -> RepoResult<Option<Post>>;
    async fn delete_post(&self, id: Uuid) -> RepoResult<bool>;

    // --- Comments ---
    // Only comments on published posts are returned.
    async fn list_comments(&self, post_id: Uuid) -> RepoResult<Vec<Comment>>;
    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, body: String) -> RepoResult<Comment>;
    /// Owner-only delete.
    async fn delete_comment(&self, id: i64, user_id: Uuid) -> RepoResult<bool>;
    /// Moderation delete (no ownership check).
    async fn delete_comment_any(&self, id: i64) -> RepoResult<bool>;

    // --- Bookmarks ---
    async fn list_bookmarks(&self, user_id: Uuid) -> RepoResult<Vec<Post>>;
    async fn count_bookmarks(&self, user_id: Uuid) -> RepoResult<i64>;
    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> RepoResult<bool>;
    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> RepoResult<bool>;

    // --- Advertisements ---
    async fn list_active_ads(&self, placement: Option<String>) -> RepoResult<Vec<Advertisement>>;
    async fn list_ads(&self) -> RepoResult<Vec<Advertisement>>;
    async fn create_ad(&self, req: CreateAdvertisementRequest) -> RepoResult<Advertisement>;
    async fn set_ad_active(&self, id: Uuid, active: bool) -> RepoResult<Option<Advertisement>>;
    async fn delete_ad(&self, id: Uuid) -> RepoResult<bool>;

    // --- Affiliate Links ---
    async fn list_affiliate_links(&self) -> RepoResult<Vec<AffiliateLink>>;
    async fn create_affiliate_link(&self, req: CreateAffiliateLinkRequest) -> RepoResult<AffiliateLink>;
    async fn delete_affiliate_link(&self, id: Uuid) -> RepoResult<bool>;
    // Increments the click counter and returns the link in one statement.
    async fn follow_affiliate_link(&self, slug: &str) -> RepoResult<Option<AffiliateLink>>;

    // --- Reader Engagement ---
    async fn create_contact_message(&self, req: ContactRequest) -> RepoResult<ContactMessage>;
    async fn list_contact_messages(&self) -> RepoResult<Vec<ContactMessage>>;
    async fn delete_contact_message(&self, id: i64) -> RepoResult<bool>;
    // Returns false when the address was already subscribed.
    async fn subscribe_newsletter(&self, email: &str) -> RepoResult<bool>;
    async fn record_rum_metric(&self, req: RumMetricRequest) -> RepoResult<RumMetric>;
    async fn summarize_rum_metrics(&self) -> RepoResult<Vec<RumMetricSummary>>;

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = "id, email, name, email_verified, newsletter_opt_in, created_at";
const POST_COLUMNS: &str =
    "id, slug, title, excerpt, body, tags, author_id, published, published_at, created_at, updated_at";
const AD_COLUMNS: &str = "id, title, image_url, target_url, placement, active, created_at";
const LINK_COLUMNS: &str = "id, slug, destination_url, description, clicks, created_at";
const CONTACT_COLUMNS: &str = "id, name, email, subject, message, created_at";
const RUM_COLUMNS: &str = "id, name, value, path, rating, recorded_at";

/// PostgresRepository
///
/// The concrete implementation of `Repository` (and `RoleLookup`) backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleLookup for PostgresRepository {
    /// lookup_roles
    ///
    /// Joins `user_roles` to `roles` and parses each slug. Unknown slugs are skipped
    /// with a warning so that a stray reference row never grants anything.
    async fn lookup_roles(&self, user_id: Uuid) -> RepoResult<BTreeSet<RoleSlug>> {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT r.slug FROM user_roles ur JOIN roles r ON r.id = ur.role_id WHERE ur.user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs
            .into_iter()
            .filter_map(|slug| match slug.parse::<RoleSlug>() {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(%user_id, "ignoring role row: {}", e);
                    None
                }
            })
            .collect())
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// create_user
    ///
    /// Creates the local mirror after provider sign-up. Re-registration of the same
    /// provider id refreshes the email instead of failing.
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let query = format!(
            "INSERT INTO users (id, email, name, email_verified) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(user.email.to_lowercase())
            .bind(user.name)
            .bind(user.email_verified)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "user"))
    }

    /// ensure_user
    ///
    /// Sessions issued by the provider outside `/auth/register` (allowlisted
    /// admins, accounts created in the provider console) have no local row yet.
    /// The CTE returns the inserted row, or the existing one when the insert was
    /// skipped; both branches see the same snapshot so exactly one row comes back.
    async fn ensure_user(&self, id: Uuid, email: &str) -> RepoResult<User> {
        let query = format!(
            "WITH inserted AS ( \
                 INSERT INTO users (id, email) VALUES ($1, $2) \
                 ON CONFLICT (id) DO NOTHING RETURNING {USER_COLUMNS} \
             ) \
             SELECT {USER_COLUMNS} FROM inserted \
             UNION ALL SELECT {USER_COLUMNS} FROM users WHERE id = $1 \
             LIMIT 1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(email.to_lowercase())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "user email"))
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> RepoResult<Option<User>> {
        let query = format!(
            "UPDATE users SET name = COALESCE($2, name), \
             newsletter_opt_in = COALESCE($3, newsletter_opt_in) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(req.name)
            .bind(req.newsletter_opt_in)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, User>(&query).fetch_all(&self.pool).await?)
    }

    async fn list_roles(&self) -> RepoResult<Vec<Role>> {
        Ok(sqlx::query_as::<_, Role>("SELECT id, slug, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn assign_role(&self, user_id: Uuid, role: RoleSlug) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) \
             SELECT $1, id FROM roles WHERE slug = $2 \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn revoke_role(&self, user_id: Uuid, role: RoleSlug) -> RepoResult<bool> {
        let result = sqlx::query(
            "DELETE FROM user_roles ur USING roles r \
             WHERE ur.role_id = r.id AND ur.user_id = $1 AND r.slug = $2",
        )
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// list_published_posts
    ///
    /// Builds the filter with `QueryBuilder` so every user-supplied value is bound,
    /// never interpolated. `published = true` is part of the base query.
    async fn list_published_posts(&self, query: PostQuery) -> RepoResult<Vec<Post>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE published = true"
        ));

        if let Some(tag) = query.tag {
            builder.push(" AND ");
            builder.push_bind(tag);
            builder.push(" = ANY(tags)");
        }

        if let Some(search) = query.search {
            let pattern = format!("%{}%", escape_like(&search));
            builder.push(" AND (title ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" ESCAPE '\\' OR excerpt ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" ESCAPE '\\' OR body ILIKE ");
            builder.push_bind(pattern);
            builder.push(" ESCAPE '\\')");
        }

        builder.push(" ORDER BY published_at DESC NULLS LAST, created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset);

        Ok(builder
            .build_query_as::<Post>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_published_post(&self, slug: &str) -> RepoResult<Option<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1 AND published = true");
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_all_posts(&self) -> RepoResult<Vec<Post>> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts ORDER BY published ASC, created_at DESC"
        );
        Ok(sqlx::query_as::<_, Post>(&query).fetch_all(&self.pool).await?)
    }

    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_post(&self, author_id: Uuid, slug: String, req: CreatePostRequest) -> RepoResult<Post> {
        let query = format!(
            "INSERT INTO posts (id, slug, title, excerpt, body, tags, author_id, published, published_at, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, CASE WHEN $8 THEN NOW() END, NOW(), NOW()) \
             RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(Uuid::new_v4())
            .bind(slug)
            .bind(req.title)
            .bind(req.excerpt)
            .bind(req.body)
            .bind(req.tags)
            .bind(author_id)
            .bind(req.publish)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "post slug"))
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>> {
        let query = format!(
            "UPDATE posts SET title = COALESCE($2, title), \
             excerpt = COALESCE($3, excerpt), \
             body = COALESCE($4, body), \
             tags = COALESCE($5, tags), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(req.title)
            .bind(req.excerpt)
            .bind(req.body)
            .bind(req.tags)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// set_post_published
    ///
    /// The first publication date is kept when a published post is re-published;
    /// unpublishing clears it.
    async fn set_post_published(&self, id: Uuid, published: bool) -> RepoResult<Option<Post>> {
        let query = format!(
            "UPDATE posts SET published = $2, \
             published_at = CASE WHEN $2 THEN COALESCE(published_at, NOW()) ELSE NULL END, \
             updated_at = NOW() \
             WHERE id = $1 RETURNING {POST_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .bind(published)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_post(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        Ok(sqlx::query_as::<_, Comment>(
            r#"
            SELECT c.id, c.post_id, c.user_id, c.body, c.created_at, u.name AS author_name
            FROM comments c
            JOIN users u ON c.user_id = u.id
            JOIN posts p ON c.post_id = p.id
            WHERE c.post_id = $1 AND p.published = true
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// add_comment
    ///
    /// Inserts and joins with `users` in one statement so the response already
    /// carries the author's display name.
    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, body: String) -> RepoResult<Comment> {
        Ok(sqlx::query_as::<_, Comment>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (post_id, user_id, body) VALUES ($1, $2, $3)
                RETURNING id, post_id, user_id, body, created_at
            )
            SELECT i.id, i.post_id, i.user_id, i.body, i.created_at, u.name AS author_name
            FROM inserted i JOIN users u ON i.user_id = u.id
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn delete_comment(&self, id: i64, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_comment_any(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_bookmarks(&self, user_id: Uuid) -> RepoResult<Vec<Post>> {
        let query = format!(
            "SELECT {} FROM bookmarks b JOIN posts p ON p.id = b.post_id \
             WHERE b.user_id = $1 AND p.published = true ORDER BY b.created_at DESC",
            prefixed_post_columns("p")
        );
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn count_bookmarks(&self, user_id: Uuid) -> RepoResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM bookmarks b JOIN posts p ON p.id = b.post_id \
                 WHERE b.user_id = $1 AND p.published = true",
            )
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?,
        )
    }

    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO bookmarks (user_id, post_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_active_ads(&self, placement: Option<String>) -> RepoResult<Vec<Advertisement>> {
        let query = format!(
            "SELECT {AD_COLUMNS} FROM advertisements \
             WHERE active = true AND ($1::TEXT IS NULL OR placement = $1) \
             ORDER BY created_at DESC"
        );
        Ok(sqlx::query_as::<_, Advertisement>(&query)
            .bind(placement)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_ads(&self) -> RepoResult<Vec<Advertisement>> {
        let query = format!("SELECT {AD_COLUMNS} FROM advertisements ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, Advertisement>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_ad(&self, req: CreateAdvertisementRequest) -> RepoResult<Advertisement> {
        let query = format!(
            "INSERT INTO advertisements (id, title, image_url, target_url, placement, active) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {AD_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Advertisement>(&query)
            .bind(Uuid::new_v4())
            .bind(req.title)
            .bind(req.image_url)
            .bind(req.target_url)
            .bind(req.placement)
            .bind(req.active)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn set_ad_active(&self, id: Uuid, active: bool) -> RepoResult<Option<Advertisement>> {
        let query =
            format!("UPDATE advertisements SET active = $2 WHERE id = $1 RETURNING {AD_COLUMNS}");
        Ok(sqlx::query_as::<_, Advertisement>(&query)
            .bind(id)
            .bind(active)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_ad(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM advertisements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_affiliate_links(&self) -> RepoResult<Vec<AffiliateLink>> {
        let query = format!("SELECT {LINK_COLUMNS} FROM affiliate_links ORDER BY slug");
        Ok(sqlx::query_as::<_, AffiliateLink>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn create_affiliate_link(&self, req: CreateAffiliateLinkRequest) -> RepoResult<AffiliateLink> {
        let query = format!(
            "INSERT INTO affiliate_links (id, slug, destination_url, description) \
             VALUES ($1, $2, $3, $4) RETURNING {LINK_COLUMNS}"
        );
        sqlx::query_as::<_, AffiliateLink>(&query)
            .bind(Uuid::new_v4())
            .bind(req.slug)
            .bind(req.destination_url)
            .bind(req.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "affiliate link slug"))
    }

    async fn delete_affiliate_link(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM affiliate_links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn follow_affiliate_link(&self, slug: &str) -> RepoResult<Option<AffiliateLink>> {
        let query = format!(
            "UPDATE affiliate_links SET clicks = clicks + 1 WHERE slug = $1 RETURNING {LINK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, AffiliateLink>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_contact_message(&self, req: ContactRequest) -> RepoResult<ContactMessage> {
        let query = format!(
            "INSERT INTO contact_messages (name, email, subject, message) \
             VALUES ($1, $2, $3, $4) RETURNING {CONTACT_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, ContactMessage>(&query)
            .bind(req.name)
            .bind(req.email)
            .bind(req.subject)
            .bind(req.message)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_contact_messages(&self) -> RepoResult<Vec<ContactMessage>> {
        let query =
            format!("SELECT {CONTACT_COLUMNS} FROM contact_messages ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, ContactMessage>(&query)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn delete_contact_message(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn subscribe_newsletter(&self, email: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            "INSERT INTO newsletter_subscribers (email) VALUES ($1) ON CONFLICT DO NOTHING",
        )
        .bind(email)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_rum_metric(&self, req: RumMetricRequest) -> RepoResult<RumMetric> {
        let query = format!(
            "INSERT INTO rum_metrics (name, value, path, rating) \
             VALUES ($1, $2, $3, $4) RETURNING {RUM_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, RumMetric>(&query)
            .bind(req.name)
            .bind(req.value)
            .bind(req.path)
            .bind(req.rating)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn summarize_rum_metrics(&self) -> RepoResult<Vec<RumMetricSummary>> {
        Ok(sqlx::query_as::<_, RumMetricSummary>(
            "SELECT name, COUNT(*) AS samples, AVG(value)::DOUBLE PRECISION AS average \
             FROM rum_metrics GROUP BY name ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// get_stats
    ///
    /// Compiles all dashboard counters in a single round trip.
    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM posts),
                (SELECT COUNT(*) FROM posts WHERE published = true),
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM comments),
                (SELECT COUNT(*) FROM advertisements WHERE active = true),
                (SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM affiliate_links)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminDashboardStats {
            total_posts: row.0,
            published_posts: row.1,
            total_users: row.2,
            total_comments: row.3,
            active_ads: row.4,
            affiliate_clicks: row.5,
        })
    }
}

fn prefixed_post_columns(alias: &str) -> String {
    POST_COLUMNS
        .split(", ")
        .map(|column| format!("{alias}.{column}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
