use axum::{
    Json,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::AppError,
    feeds::{self, FEED_LIMIT, FeedSettings},
    models::{Advertisement, Comment, Post},
    repository::PostQuery,
};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 50;
// Upper bound of URLs a single sitemap file may hold.
const SITEMAP_LIMIT: i64 = 50_000;
const SITEMAP_STATIC_PATHS: &[&str] = &["/", "/blog"];

/// PostFilter
///
/// Query parameters for the public post listing (GET /blog).
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct PostFilter {
    /// Only posts carrying this tag.
    pub tag: Option<String>,
    /// Case-insensitive match against title, excerpt and body.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Defaults to 10, clamped to 1..=50.
    pub per_page: Option<u32>,
}

impl PostFilter {
    pub fn to_query(&self) -> PostQuery {
        let per_page = self
            .per_page
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE) as i64;
        let page = self.page.unwrap_or(1).max(1) as i64;

        PostQuery {
            tag: non_blank(self.tag.as_deref()),
            search: non_blank(self.search.as_deref()),
            limit: per_page,
            offset: (page - 1) * per_page,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct AdFilter {
    pub placement: Option<String>,
}

/// list_posts
///
/// [Public Route] Published posts, newest first, with tag/search filters and paging.
#[utoipa::path(
    get,
    path = "/blog",
    params(PostFilter),
    responses((status = 200, description = "Published posts", body = [Post]))
)]
pub async fn list_posts(
    State(state): State<AppState>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.repo.list_published_posts(filter.to_query()).await?))
}

/// get_post
///
/// [Public Route] A single published post. Drafts are indistinguishable from
/// missing posts.
#[utoipa::path(
    get,
    path = "/blog/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, AppError> {
    state
        .repo
        .get_published_post(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("post".to_string()))
}

#[utoipa::path(
    get,
    path = "/blog/{slug}/comments",
    params(("slug" = String, Path, description = "Post slug")),
    responses((status = 200, description = "Comments", body = [Comment]))
)]
pub async fn list_post_comments(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let post = state
        .repo
        .get_published_post(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("post".to_string()))?;
    Ok(Json(state.repo.list_comments(post.id).await?))
}

#[utoipa::path(
    get,
    path = "/ads",
    params(AdFilter),
    responses((status = 200, description = "Active advertisements", body = [Advertisement]))
)]
pub async fn list_active_ads(
    State(state): State<AppState>,
    Query(filter): Query<AdFilter>,
) -> Result<Json<Vec<Advertisement>>, AppError> {
    let placement = non_blank(filter.placement.as_deref());
    Ok(Json(state.repo.list_active_ads(placement).await?))
}

/// follow_affiliate_link
///
/// [Public Route] Counts the click and redirects to the partner URL.
#[utoipa::path(
    get,
    path = "/go/{slug}",
    params(("slug" = String, Path, description = "Affiliate link slug")),
    responses(
        (status = 307, description = "Redirect to destination"),
        (status = 404, description = "Unknown link")
    )
)]
pub async fn follow_affiliate_link(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Redirect, AppError> {
    let link = state
        .repo
        .follow_affiliate_link(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("affiliate link".to_string()))?;
    Ok(Redirect::temporary(&link.destination_url))
}

#[utoipa::path(
    get,
    path = "/rss.xml",
    responses((status = 200, description = "RSS 2.0 feed", content_type = "application/rss+xml"))
)]
pub async fn rss_feed(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state
        .repo
        .list_published_posts(PostQuery {
            limit: FEED_LIMIT,
            ..PostQuery::default()
        })
        .await?;

    let settings = FeedSettings {
        site_url: state.config.site_url.clone(),
        site_title: state.config.site_title.clone(),
        description: format!("Latest posts from {}", state.config.site_title),
    };

    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        feeds::render_rss(&settings, &posts),
    ))
}

#[utoipa::path(
    get,
    path = "/sitemap.xml",
    responses((status = 200, description = "Sitemap", content_type = "application/xml"))
)]
pub async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let posts = state
        .repo
        .list_published_posts(PostQuery {
            limit: SITEMAP_LIMIT,
            ..PostQuery::default()
        })
        .await?;

    Ok((
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        feeds::render_sitemap(&state.config.site_url, SITEMAP_STATIC_PATHS, &posts),
    ))
}
