#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::HeaderMap;
use blog_platform::{
    AppState,
    auth::{AccessGate, AuthProviderClient, RoleLookup, SessionResolver, SessionUser},
    config::{AdminAllowlist, AppConfig},
    error::{RepositoryError, SessionError},
    models::{
        AdminDashboardStats, Advertisement, AffiliateLink, Comment, ContactMessage,
        ContactRequest, CreateAdvertisementRequest, CreateAffiliateLinkRequest, CreatePostRequest,
        NewUser, Post, Role, RoleSlug, RumMetric, RumMetricRequest, RumMetricSummary,
        UpdatePostRequest, UpdateProfileRequest, User,
    },
    repository::{PostQuery, RepoResult, Repository},
};
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use uuid::Uuid;

pub const READER_ID: Uuid = Uuid::from_u128(0x100);
pub const ADMIN_ID: Uuid = Uuid::from_u128(0x200);
pub const MODERATOR_ID: Uuid = Uuid::from_u128(0x300);

pub fn reader() -> SessionUser {
    SessionUser {
        id: READER_ID,
        email: "reader@example.com".to_string(),
    }
}

pub fn admin() -> SessionUser {
    SessionUser {
        id: ADMIN_ID,
        email: "admin@example.com".to_string(),
    }
}

pub fn moderator() -> SessionUser {
    SessionUser {
        id: MODERATOR_ID,
        email: "mod@example.com".to_string(),
    }
}

pub fn user_row(session: &SessionUser) -> User {
    User {
        id: session.id,
        email: session.email.clone(),
        created_at: Utc::now(),
        ..User::default()
    }
}

pub fn published_post(slug: &str) -> Post {
    Post {
        id: Uuid::new_v4(),
        slug: slug.to_string(),
        title: format!("Post {slug}"),
        body: "body".to_string(),
        author_id: ADMIN_ID,
        published: true,
        published_at: Some(Utc::now()),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ..Post::default()
    }
}

pub fn draft_post(slug: &str) -> Post {
    Post {
        published: false,
        published_at: None,
        ..published_post(slug)
    }
}

// --- In-memory repository ---

/// MockRepo
///
/// In-memory `Repository` + `RoleLookup`. Role lookups are counted so tests can
/// prove the gate skipped them. Writes that reference a user fail like the
/// Postgres foreign keys do when that user has no row.
#[derive(Default)]
pub struct MockRepo {
    pub users: Mutex<Vec<User>>,
    pub roles: Mutex<HashMap<Uuid, BTreeSet<RoleSlug>>>,
    pub posts: Mutex<Vec<Post>>,
    pub comments: Mutex<Vec<Comment>>,
    pub bookmarks: Mutex<HashSet<(Uuid, Uuid)>>,
    pub ads: Mutex<Vec<Advertisement>>,
    pub links: Mutex<Vec<AffiliateLink>>,
    pub contact_messages: Mutex<Vec<ContactMessage>>,
    pub subscribers: Mutex<HashSet<String>>,
    pub rum_metrics: Mutex<Vec<RumMetric>>,
    pub role_lookups: AtomicUsize,
    pub fail_role_lookup: bool,
}

impl MockRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, session: &SessionUser, roles: &[RoleSlug]) -> Self {
        self.users.lock().unwrap().push(user_row(session));
        self.roles
            .lock()
            .unwrap()
            .insert(session.id, roles.iter().copied().collect());
        self
    }

    pub fn with_post(self, post: Post) -> Self {
        self.posts.lock().unwrap().push(post);
        self
    }

    pub fn with_comment(self, id: i64, post_id: Uuid, user_id: Uuid) -> Self {
        self.comments.lock().unwrap().push(Comment {
            id,
            post_id,
            user_id,
            body: "hello".to_string(),
            created_at: Utc::now(),
            author_name: None,
        });
        self
    }

    pub fn with_link(self, slug: &str, destination_url: &str) -> Self {
        self.links.lock().unwrap().push(AffiliateLink {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            destination_url: destination_url.to_string(),
            created_at: Utc::now(),
            ..AffiliateLink::default()
        });
        self
    }

    pub fn failing_role_lookup(mut self) -> Self {
        self.fail_role_lookup = true;
        self
    }

    pub fn role_lookups(&self) -> usize {
        self.role_lookups.load(Ordering::SeqCst)
    }

    pub fn has_user(&self, id: Uuid) -> bool {
        self.users.lock().unwrap().iter().any(|u| u.id == id)
    }

    fn require_user(&self, id: Uuid) -> RepoResult<()> {
        if self.has_user(id) {
            Ok(())
        } else {
            Err(RepositoryError::Database(sqlx::Error::Protocol(
                "violates foreign key constraint on users".to_string(),
            )))
        }
    }
}

fn db_down() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl RoleLookup for MockRepo {
    async fn lookup_roles(&self, user_id: Uuid) -> RepoResult<BTreeSet<RoleSlug>> {
        self.role_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_role_lookup {
            return Err(db_down());
        }
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let row = User {
            id: user.id,
            email: user.email,
            name: user.name,
            email_verified: user.email_verified,
            newsletter_opt_in: false,
            created_at: Utc::now(),
        };
        self.users.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn ensure_user(&self, id: Uuid, email: &str) -> RepoResult<User> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.iter().find(|u| u.id == id) {
            return Ok(existing.clone());
        }
        let row = User {
            id,
            email: email.to_lowercase(),
            created_at: Utc::now(),
            ..User::default()
        };
        users.push(row.clone());
        Ok(row)
    }

    async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> RepoResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            if let Some(name) = req.name {
                user.name = Some(name);
            }
            if let Some(opt_in) = req.newsletter_opt_in {
                user.newsletter_opt_in = opt_in;
            }
            user.clone()
        }))
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn list_roles(&self) -> RepoResult<Vec<Role>> {
        Ok(RoleSlug::ALL
            .iter()
            .enumerate()
            .map(|(i, slug)| Role {
                id: i as i32 + 1,
                slug: slug.to_string(),
                name: slug.to_string(),
            })
            .collect())
    }

    async fn assign_role(&self, user_id: Uuid, role: RoleSlug) -> RepoResult<bool> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .entry(user_id)
            .or_default()
            .insert(role))
    }

    async fn revoke_role(&self, user_id: Uuid, role: RoleSlug) -> RepoResult<bool> {
        Ok(self
            .roles
            .lock()
            .unwrap()
            .get_mut(&user_id)
            .is_some_and(|roles| roles.remove(&role)))
    }

    async fn list_published_posts(&self, query: PostQuery) -> RepoResult<Vec<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.published)
            .filter(|p| query.tag.as_ref().is_none_or(|t| p.tags.contains(t)))
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn get_published_post(&self, slug: &str) -> RepoResult<Option<Post>> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.slug == slug && p.published)
            .cloned())
    }

    async fn list_all_posts(&self) -> RepoResult<Vec<Post>> {
        Ok(self.posts.lock().unwrap().clone())
    }

    async fn get_post(&self, id: Uuid) -> RepoResult<Option<Post>> {
        Ok(self.posts.lock().unwrap().iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, author_id: Uuid, slug: String, req: CreatePostRequest) -> RepoResult<Post> {
        self.require_user(author_id)?;
        let mut posts = self.posts.lock().unwrap();
        if posts.iter().any(|p| p.slug == slug) {
            return Err(RepositoryError::Conflict("post slug".to_string()));
        }
        let post = Post {
            id: Uuid::new_v4(),
            slug,
            title: req.title,
            excerpt: req.excerpt,
            body: req.body,
            tags: req.tags,
            author_id,
            published: req.publish,
            published_at: req.publish.then(Utc::now),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> RepoResult<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|post| {
            if let Some(title) = req.title {
                post.title = title;
            }
            if let Some(body) = req.body {
                post.body = body;
            }
            post.clone()
        }))
    }

    async fn set_post_published(&self, id: Uuid, published: bool) -> RepoResult<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|post| {
            post.published = published;
            post.published_at = if published {
                post.published_at.or_else(|| Some(Utc::now()))
            } else {
                None
            };
            post.clone()
        }))
    }

    async fn delete_post(&self, id: Uuid) -> RepoResult<bool> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn list_comments(&self, post_id: Uuid) -> RepoResult<Vec<Comment>> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn add_comment(&self, post_id: Uuid, user_id: Uuid, body: String) -> RepoResult<Comment> {
        self.require_user(user_id)?;
        let mut comments = self.comments.lock().unwrap();
        let comment = Comment {
            id: comments.len() as i64 + 1,
            post_id,
            user_id,
            body,
            created_at: Utc::now(),
            author_name: None,
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: i64, user_id: Uuid) -> RepoResult<bool> {
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| !(c.id == id && c.user_id == user_id));
        Ok(comments.len() < before)
    }

    async fn delete_comment_any(&self, id: i64) -> RepoResult<bool> {
        let mut comments = self.comments.lock().unwrap();
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() < before)
    }

    async fn list_bookmarks(&self, user_id: Uuid) -> RepoResult<Vec<Post>> {
        let bookmarks = self.bookmarks.lock().unwrap();
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.published && bookmarks.contains(&(user_id, p.id)))
            .cloned()
            .collect())
    }

    async fn count_bookmarks(&self, user_id: Uuid) -> RepoResult<i64> {
        Ok(self.list_bookmarks(user_id).await?.len() as i64)
    }

    async fn add_bookmark(&self, user_id: Uuid, post_id: Uuid) -> RepoResult<bool> {
        self.require_user(user_id)?;
        Ok(self.bookmarks.lock().unwrap().insert((user_id, post_id)))
    }

    async fn remove_bookmark(&self, user_id: Uuid, post_id: Uuid) -> RepoResult<bool> {
        Ok(self.bookmarks.lock().unwrap().remove(&(user_id, post_id)))
    }

    async fn list_active_ads(&self, placement: Option<String>) -> RepoResult<Vec<Advertisement>> {
        Ok(self
            .ads
            .lock()
            .unwrap()
            .iter()
            .filter(|ad| ad.active)
            .filter(|ad| placement.as_ref().is_none_or(|p| &ad.placement == p))
            .cloned()
            .collect())
    }

    async fn list_ads(&self) -> RepoResult<Vec<Advertisement>> {
        Ok(self.ads.lock().unwrap().clone())
    }

    async fn create_ad(&self, req: CreateAdvertisementRequest) -> RepoResult<Advertisement> {
        let ad = Advertisement {
            id: Uuid::new_v4(),
            title: req.title,
            image_url: req.image_url,
            target_url: req.target_url,
            placement: req.placement,
            active: req.active,
            created_at: Utc::now(),
        };
        self.ads.lock().unwrap().push(ad.clone());
        Ok(ad)
    }

    async fn set_ad_active(&self, id: Uuid, active: bool) -> RepoResult<Option<Advertisement>> {
        let mut ads = self.ads.lock().unwrap();
        Ok(ads.iter_mut().find(|ad| ad.id == id).map(|ad| {
            ad.active = active;
            ad.clone()
        }))
    }

    async fn delete_ad(&self, id: Uuid) -> RepoResult<bool> {
        let mut ads = self.ads.lock().unwrap();
        let before = ads.len();
        ads.retain(|ad| ad.id != id);
        Ok(ads.len() < before)
    }

    async fn list_affiliate_links(&self) -> RepoResult<Vec<AffiliateLink>> {
        Ok(self.links.lock().unwrap().clone())
    }

    async fn create_affiliate_link(&self, req: CreateAffiliateLinkRequest) -> RepoResult<AffiliateLink> {
        let mut links = self.links.lock().unwrap();
        if links.iter().any(|l| l.slug == req.slug) {
            return Err(RepositoryError::Conflict("affiliate link slug".to_string()));
        }
        let link = AffiliateLink {
            id: Uuid::new_v4(),
            slug: req.slug,
            destination_url: req.destination_url,
            description: req.description,
            clicks: 0,
            created_at: Utc::now(),
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn delete_affiliate_link(&self, id: Uuid) -> RepoResult<bool> {
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.id != id);
        Ok(links.len() < before)
    }

    async fn follow_affiliate_link(&self, slug: &str) -> RepoResult<Option<AffiliateLink>> {
        let mut links = self.links.lock().unwrap();
        Ok(links.iter_mut().find(|l| l.slug == slug).map(|link| {
            link.clicks += 1;
            link.clone()
        }))
    }

    async fn create_contact_message(&self, req: ContactRequest) -> RepoResult<ContactMessage> {
        let mut messages = self.contact_messages.lock().unwrap();
        let message = ContactMessage {
            id: messages.len() as i64 + 1,
            name: req.name,
            email: req.email,
            subject: req.subject,
            message: req.message,
            created_at: Utc::now(),
        };
        messages.push(message.clone());
        Ok(message)
    }

    async fn list_contact_messages(&self) -> RepoResult<Vec<ContactMessage>> {
        let mut messages = self.contact_messages.lock().unwrap().clone();
        messages.reverse();
        Ok(messages)
    }

    async fn delete_contact_message(&self, id: i64) -> RepoResult<bool> {
        let mut messages = self.contact_messages.lock().unwrap();
        let before = messages.len();
        messages.retain(|m| m.id != id);
        Ok(messages.len() < before)
    }

    async fn subscribe_newsletter(&self, email: &str) -> RepoResult<bool> {
        Ok(self.subscribers.lock().unwrap().insert(email.to_string()))
    }

    async fn record_rum_metric(&self, req: RumMetricRequest) -> RepoResult<RumMetric> {
        let mut metrics = self.rum_metrics.lock().unwrap();
        let metric = RumMetric {
            id: metrics.len() as i64 + 1,
            name: req.name,
            value: req.value,
            path: req.path,
            rating: req.rating,
            recorded_at: Utc::now(),
        };
        metrics.push(metric.clone());
        Ok(metric)
    }

    async fn summarize_rum_metrics(&self) -> RepoResult<Vec<RumMetricSummary>> {
        let metrics = self.rum_metrics.lock().unwrap();
        let mut by_name: BTreeMap<String, (i64, f64)> = BTreeMap::new();
        for metric in metrics.iter() {
            let entry = by_name.entry(metric.name.clone()).or_default();
            entry.0 += 1;
            entry.1 += metric.value;
        }
        Ok(by_name
            .into_iter()
            .map(|(name, (samples, total))| RumMetricSummary {
                name,
                samples,
                average: total / samples as f64,
            })
            .collect())
    }

    async fn get_stats(&self) -> RepoResult<AdminDashboardStats> {
        let posts = self.posts.lock().unwrap();
        Ok(AdminDashboardStats {
            total_posts: posts.len() as i64,
            published_posts: posts.iter().filter(|p| p.published).count() as i64,
            total_users: self.users.lock().unwrap().len() as i64,
            total_comments: self.comments.lock().unwrap().len() as i64,
            active_ads: self.ads.lock().unwrap().iter().filter(|a| a.active).count() as i64,
            affiliate_clicks: self.links.lock().unwrap().iter().map(|l| l.clicks).sum(),
        })
    }
}

// --- Session fakes ---

/// Resolves every request to the same (optional) user.
pub struct FixedSession(pub Option<SessionUser>);

#[async_trait]
impl SessionResolver for FixedSession {
    async fn resolve_session(&self, _headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError> {
        Ok(self.0.clone())
    }
}

/// Simulates an unreachable auth provider.
pub struct FailingSession;

#[async_trait]
impl SessionResolver for FailingSession {
    async fn resolve_session(&self, _headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError> {
        Err(SessionError::ProviderStatus(503))
    }
}

// --- State builders ---

pub fn config_with_allowlist(emails: &str) -> AppConfig {
    AppConfig {
        admin_allowlist: AdminAllowlist::parse(emails),
        ..AppConfig::default()
    }
}

pub fn state_with(
    repo: Arc<MockRepo>,
    sessions: Arc<dyn SessionResolver>,
    config: AppConfig,
) -> AppState {
    AppState {
        repo: repo.clone(),
        roles: repo,
        sessions,
        gate: AccessGate::from_config(&config).unwrap(),
        provider: AuthProviderClient::new(&config),
        config,
    }
}

pub fn state_for(repo: Arc<MockRepo>, session: Option<SessionUser>) -> AppState {
    state_with(repo, Arc::new(FixedSession(session)), AppConfig::default())
}
