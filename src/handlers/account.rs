use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use super::{ensure_local_user, require_text};
use crate::{
    AppState,
    auth::{AuthUser, roles::has_any_role},
    error::AppError,
    models::{
        AccountOverview, Comment, CreateCommentRequest, Post, RoleSlug, UpdateProfileRequest,
        UserProfile,
    },
};

pub const MAX_COMMENT_CHARS: usize = 5000;
pub const MAX_NAME_CHARS: usize = 100;

async fn load_profile(state: &AppState, session: &AuthUser) -> Result<UserProfile, AppError> {
    let user = ensure_local_user(state, session).await?;
    let roles = state.roles.lookup_roles(user.id).await?;
    Ok(UserProfile {
        id: user.id,
        email: user.email,
        name: user.name,
        newsletter_opt_in: user.newsletter_opt_in,
        roles: roles.into_iter().collect(),
    })
}

/// Loads a post that readers may interact with (exists and is published).
async fn published_post(state: &AppState, post_id: Uuid) -> Result<Post, AppError> {
    state
        .repo
        .get_post(post_id)
        .await?
        .filter(|post| post.published)
        .ok_or_else(|| AppError::NotFound("post".to_string()))
}

/// get_account
///
/// [Account Route] Overview for the signed-in user: profile, roles, bookmark count.
#[utoipa::path(
    get,
    path = "/account",
    responses((status = 200, description = "Account overview", body = AccountOverview))
)]
pub async fn get_account(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AccountOverview>, AppError> {
    let profile = load_profile(&state, &user).await?;
    let bookmark_count = state.repo.count_bookmarks(user.id).await?;
    Ok(Json(AccountOverview {
        profile,
        bookmark_count,
    }))
}

#[utoipa::path(
    get,
    path = "/account/profile",
    responses((status = 200, description = "Profile", body = UserProfile))
)]
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = load_profile(&state, &user).await?;
    Ok(Json(profile))
}

/// update_profile
///
/// [Account Route] Partial update of the application-owned profile fields.
#[utoipa::path(
    put,
    path = "/account/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated", body = UserProfile),
        (status = 400, description = "Invalid name")
    )
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    if let Some(name) = payload.name.take() {
        let name = require_text("name", &name)?;
        if name.chars().count() > MAX_NAME_CHARS {
            return Err(AppError::BadRequest(format!(
                "name must be at most {MAX_NAME_CHARS} characters"
            )));
        }
        payload.name = Some(name);
    }

    ensure_local_user(&state, &user).await?;
    state
        .repo
        .update_profile(user.id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound("profile".to_string()))?;

    let profile = load_profile(&state, &user).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/account/bookmarks",
    responses((status = 200, description = "Bookmarked posts", body = [Post]))
)]
pub async fn list_bookmarks(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, AppError> {
    Ok(Json(state.repo.list_bookmarks(id).await?))
}

/// add_bookmark
///
/// [Account Route] Idempotent: 201 when the bookmark is new, 200 when it already existed.
#[utoipa::path(
    post,
    path = "/account/bookmarks/{post_id}",
    params(("post_id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 201, description = "Bookmarked"),
        (status = 200, description = "Already bookmarked"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn add_bookmark(
    user: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    published_post(&state, post_id).await?;
    ensure_local_user(&state, &user).await?;
    match state.repo.add_bookmark(user.id, post_id).await? {
        true => Ok(StatusCode::CREATED),
        false => Ok(StatusCode::OK),
    }
}

#[utoipa::path(
    delete,
    path = "/account/bookmarks/{post_id}",
    params(("post_id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Removed"),
        (status = 404, description = "Not bookmarked")
    )
)]
pub async fn remove_bookmark(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.repo.remove_bookmark(id, post_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("bookmark".to_string()))
    }
}

/// add_comment
///
/// [Account Route] Comments are only accepted on published posts.
#[utoipa::path(
    post,
    path = "/account/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment added", body = Comment),
        (status = 400, description = "Empty or oversized body"),
        (status = 404, description = "Post not found")
    )
)]
pub async fn add_comment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let body = require_text("body", &payload.body)?;
    if body.chars().count() > MAX_COMMENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "body must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }

    published_post(&state, payload.post_id).await?;
    ensure_local_user(&state, &user).await?;
    let comment = state.repo.add_comment(payload.post_id, user.id, body).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// delete_comment
///
/// [Account Route] Authors delete their own comments; admins and moderators may
/// delete any comment.
#[utoipa::path(
    delete,
    path = "/account/comments/{id}",
    params(("id" = i64, Path, description = "Comment ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found or not yours")
    )
)]
pub async fn delete_comment(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let can_moderate = has_any_role(
        state.roles.as_ref(),
        user_id,
        &[RoleSlug::Admin, RoleSlug::Moderator],
    )
    .await?;

    let deleted = if can_moderate {
        state.repo.delete_comment_any(id).await?
    } else {
        state.repo.delete_comment(id, user_id).await?
    };

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("comment".to_string()))
    }
}
