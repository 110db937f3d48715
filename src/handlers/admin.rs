use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{ensure_local_user, require_http_url, require_text};
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    models::{
        AdminDashboardStats, Advertisement, AffiliateLink, AssignRoleRequest, ContactMessage,
        CreateAdvertisementRequest, CreateAffiliateLinkRequest, CreatePostRequest, Post, Role,
        RoleSlug, RumMetricSummary, UpdatePostRequest, User, is_valid_slug, slugify,
    },
};

// Every handler here sits behind the access gate's admin rule; the `AuthUser`
// argument identifies the operator for audit logging.

/// get_dashboard
///
/// [Admin Route] Core counters for the dashboard landing page.
#[utoipa::path(
    get,
    path = "/admin",
    responses((status = 200, description = "Stats", body = AdminDashboardStats))
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
) -> Result<Json<AdminDashboardStats>, AppError> {
    Ok(Json(state.repo.get_stats().await?))
}

// --- Posts ---

#[utoipa::path(
    get,
    path = "/admin/posts",
    responses((status = 200, description = "All posts including drafts", body = [Post]))
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.repo.list_all_posts().await?))
}

/// create_post
///
/// [Admin Route] The slug defaults to the slugified title. An explicit slug must
/// already be in canonical form. Duplicate slugs yield 409.
#[utoipa::path(
    post,
    path = "/admin/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Invalid title or slug"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_post(
    user: AuthUser,
    State(state): State<AppState>,
    Json(mut payload): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), AppError> {
    payload.title = require_text("title", &payload.title)?;

    let slug = match payload.slug.take() {
        Some(slug) if is_valid_slug(&slug) => slug,
        Some(_) => return Err(AppError::BadRequest("invalid slug".to_string())),
        None => slugify(&payload.title),
    };
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "title must contain at least one letter or digit".to_string(),
        ));
    }

    payload.tags = payload
        .tags
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect();

    ensure_local_user(&state, &user).await?;
    let post = state.repo.create_post(user.id, slug, payload).await?;
    tracing::info!(admin_id = %user.id, post_id = %post.id, slug = %post.slug, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    put,
    path = "/admin/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    if let Some(title) = &payload.title {
        require_text("title", title)?;
    }
    state
        .repo
        .update_post(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("post".to_string()))
}

/// set_post_published
///
/// [Admin Route] Publishes (`true`) or withdraws (`false`) a post.
#[utoipa::path(
    put,
    path = "/admin/posts/{id}/published",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = bool,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_post_published(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(published): Json<bool>,
) -> Result<Json<Post>, AppError> {
    let post = state
        .repo
        .set_post_published(id, published)
        .await?
        .ok_or_else(|| AppError::NotFound("post".to_string()))?;
    tracing::info!(%admin_id, post_id = %id, published, "post visibility changed");
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/admin/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_post(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_post(id).await? {
        tracing::info!(%admin_id, post_id = %id, "post deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("post".to_string()))
    }
}

// --- Advertisements ---

#[utoipa::path(
    get,
    path = "/admin/advertisements",
    responses((status = 200, description = "All advertisements", body = [Advertisement]))
)]
pub async fn list_ads(State(state): State<AppState>) -> Result<Json<Vec<Advertisement>>, AppError> {
    Ok(Json(state.repo.list_ads().await?))
}

#[utoipa::path(
    post,
    path = "/admin/advertisements",
    request_body = CreateAdvertisementRequest,
    responses(
        (status = 201, description = "Created", body = Advertisement),
        (status = 400, description = "Invalid payload")
    )
)]
pub async fn create_ad(
    State(state): State<AppState>,
    Json(mut payload): Json<CreateAdvertisementRequest>,
) -> Result<(StatusCode, Json<Advertisement>), AppError> {
    payload.title = require_text("title", &payload.title)?;
    payload.placement = require_text("placement", &payload.placement)?.to_lowercase();
    require_http_url("image_url", &payload.image_url)?;
    require_http_url("target_url", &payload.target_url)?;

    let ad = state.repo.create_ad(payload).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

#[utoipa::path(
    put,
    path = "/admin/advertisements/{id}/active",
    params(("id" = Uuid, Path, description = "Advertisement ID")),
    request_body = bool,
    responses(
        (status = 200, description = "Updated", body = Advertisement),
        (status = 404, description = "Not found")
    )
)]
pub async fn set_ad_active(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(active): Json<bool>,
) -> Result<Json<Advertisement>, AppError> {
    state
        .repo
        .set_ad_active(id, active)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("advertisement".to_string()))
}

#[utoipa::path(
    delete,
    path = "/admin/advertisements/{id}",
    params(("id" = Uuid, Path, description = "Advertisement ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_ad(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_ad(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("advertisement".to_string()))
    }
}

// --- Affiliate Links ---

#[utoipa::path(
    get,
    path = "/admin/affiliate-links",
    responses((status = 200, description = "All affiliate links", body = [AffiliateLink]))
)]
pub async fn list_affiliate_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<AffiliateLink>>, AppError> {
    Ok(Json(state.repo.list_affiliate_links().await?))
}

#[utoipa::path(
    post,
    path = "/admin/affiliate-links",
    request_body = CreateAffiliateLinkRequest,
    responses(
        (status = 201, description = "Created", body = AffiliateLink),
        (status = 400, description = "Invalid slug or URL"),
        (status = 409, description = "Slug already taken")
    )
)]
pub async fn create_affiliate_link(
    State(state): State<AppState>,
    Json(payload): Json<CreateAffiliateLinkRequest>,
) -> Result<(StatusCode, Json<AffiliateLink>), AppError> {
    if !is_valid_slug(&payload.slug) {
        return Err(AppError::BadRequest("invalid slug".to_string()));
    }
    require_http_url("destination_url", &payload.destination_url)?;

    let link = state.repo.create_affiliate_link(payload).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

#[utoipa::path(
    delete,
    path = "/admin/affiliate-links/{id}",
    params(("id" = Uuid, Path, description = "Affiliate link ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_affiliate_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_affiliate_link(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("affiliate link".to_string()))
    }
}

// --- Users & Roles ---

#[utoipa::path(
    get,
    path = "/admin/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.repo.list_users().await?))
}

#[utoipa::path(
    get,
    path = "/admin/roles",
    responses((status = 200, description = "Role reference data", body = [Role]))
)]
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(state.repo.list_roles().await?))
}

#[utoipa::path(
    get,
    path = "/admin/users/{user_id}/roles",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses((status = 200, description = "Assigned role slugs", body = [RoleSlug]))
)]
pub async fn get_user_roles(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<RoleSlug>>, AppError> {
    let roles = state.roles.lookup_roles(user_id).await?;
    Ok(Json(roles.into_iter().collect()))
}

/// assign_role
///
/// [Admin Route] Idempotent: 201 for a new assignment, 200 if it already existed.
#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/roles",
    params(("user_id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleRequest,
    responses(
        (status = 201, description = "Assigned"),
        (status = 200, description = "Already assigned"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn assign_role(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AssignRoleRequest>,
) -> Result<StatusCode, AppError> {
    if state.repo.get_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("user".to_string()));
    }

    let inserted = state.repo.assign_role(user_id, payload.role).await?;
    tracing::info!(%admin_id, %user_id, role = %payload.role, inserted, "role assigned");
    Ok(if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    })
}

/// revoke_role
///
/// [Admin Route] An operator may not revoke their own `admin` role, so the last
/// path back into the dashboard is never removed by accident.
#[utoipa::path(
    delete,
    path = "/admin/users/{user_id}/roles/{role}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("role" = RoleSlug, Path, description = "Role slug")
    ),
    responses(
        (status = 204, description = "Revoked"),
        (status = 400, description = "Self-demotion refused"),
        (status = 404, description = "Not assigned")
    )
)]
pub async fn revoke_role(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path((user_id, role)): Path<(Uuid, RoleSlug)>,
) -> Result<StatusCode, AppError> {
    if user_id == admin_id && role == RoleSlug::Admin {
        return Err(AppError::BadRequest(
            "cannot revoke your own admin role".to_string(),
        ));
    }

    if state.repo.revoke_role(user_id, role).await? {
        tracing::info!(%admin_id, %user_id, %role, "role revoked");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("role assignment".to_string()))
    }
}

// --- Moderation ---

#[utoipa::path(
    delete,
    path = "/admin/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_comment(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_comment_any(id).await? {
        tracing::info!(%admin_id, comment_id = id, "comment removed by admin");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("comment".to_string()))
    }
}

// --- Reader Engagement ---

#[utoipa::path(
    get,
    path = "/admin/contact-messages",
    responses((status = 200, description = "Contact-form submissions, newest first", body = [ContactMessage]))
)]
pub async fn list_contact_messages(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    Ok(Json(state.repo.list_contact_messages().await?))
}

#[utoipa::path(
    delete,
    path = "/admin/contact-messages/{id}",
    params(("id" = i64, Path, description = "Message ID")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_contact_message(
    AuthUser { id: admin_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if state.repo.delete_contact_message(id).await? {
        tracing::info!(%admin_id, message_id = id, "contact message deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("contact message".to_string()))
    }
}

/// rum_summary
///
/// [Admin Route] Sample count and average value per Web Vitals metric.
#[utoipa::path(
    get,
    path = "/admin/rum",
    responses((status = 200, description = "Per-metric aggregates", body = [RumMetricSummary]))
)]
pub async fn rum_summary(
    State(state): State<AppState>,
) -> Result<Json<Vec<RumMetricSummary>>, AppError> {
    Ok(Json(state.repo.summarize_rum_metrics().await?))
}
