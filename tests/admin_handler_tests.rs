mod common;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use blog_platform::{
    auth::AuthUser,
    handlers::admin,
    models::{
        AssignRoleRequest, CreateAdvertisementRequest, CreateAffiliateLinkRequest,
        CreatePostRequest, RoleSlug,
    },
};
use common::{ADMIN_ID, MockRepo, READER_ID, draft_post, published_post, reader, state_for};
use std::sync::Arc;

fn admin_user() -> AuthUser {
    common::admin().into()
}

fn post_request(title: &str, slug: Option<&str>) -> CreatePostRequest {
    CreatePostRequest {
        title: title.to_string(),
        slug: slug.map(str::to_string),
        body: "Body".to_string(),
        tags: vec![" Rust ".to_string(), "".to_string()],
        ..CreatePostRequest::default()
    }
}

// --- Posts ---

#[tokio::test]
async fn test_create_post_derives_slug_from_title() {
    let repo = Arc::new(MockRepo::new());
    let state = state_for(repo, Some(common::admin()));

    let (status, Json(post)) = admin::create_post(
        admin_user(),
        State(state),
        Json(post_request("Hello, World!", None)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.author_id, ADMIN_ID);
    assert_eq!(post.tags, vec!["rust".to_string()]);
    assert!(!post.published);
}

#[tokio::test]
async fn test_create_post_rejects_bad_slugs_and_titles() {
    let state = state_for(Arc::new(MockRepo::new()), Some(common::admin()));

    for request in [
        post_request("Fine title", Some("Not A Slug")),
        post_request("   ", None),
        post_request("!!!", None),
    ] {
        let err = admin::create_post(admin_user(), State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_duplicate_post_slug_conflicts() {
    let repo = Arc::new(MockRepo::new().with_post(published_post("taken")));
    let state = state_for(repo, Some(common::admin()));

    let err = admin::create_post(
        admin_user(),
        State(state),
        Json(post_request("Another", Some("taken"))),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_publish_and_unpublish() {
    let draft = draft_post("soon");
    let repo = Arc::new(MockRepo::new().with_post(draft.clone()));
    let state = state_for(repo, Some(common::admin()));

    let Json(post) = admin::set_post_published(
        admin_user(),
        State(state.clone()),
        Path(draft.id),
        Json(true),
    )
    .await
    .unwrap();
    assert!(post.published);
    assert!(post.published_at.is_some());

    let Json(post) =
        admin::set_post_published(admin_user(), State(state), Path(draft.id), Json(false))
            .await
            .unwrap();
    assert!(!post.published);
    assert!(post.published_at.is_none());
}

#[tokio::test]
async fn test_delete_unknown_post_is_not_found() {
    let state = state_for(Arc::new(MockRepo::new()), Some(common::admin()));

    let err = admin::delete_post(admin_user(), State(state), Path(uuid::Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

// --- Monetization ---

#[tokio::test]
async fn test_create_ad_requires_http_urls() {
    let state = state_for(Arc::new(MockRepo::new()), Some(common::admin()));

    let err = admin::create_ad(
        State(state.clone()),
        Json(CreateAdvertisementRequest {
            title: "Sponsor".to_string(),
            image_url: "javascript:alert(1)".to_string(),
            target_url: "https://sponsor.example".to_string(),
            placement: "sidebar".to_string(),
            active: true,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);

    let (status, Json(ad)) = admin::create_ad(
        State(state),
        Json(CreateAdvertisementRequest {
            title: "Sponsor".to_string(),
            image_url: "https://cdn.example/banner.png".to_string(),
            target_url: "https://sponsor.example".to_string(),
            placement: " Sidebar ".to_string(),
            active: true,
        }),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ad.placement, "sidebar");
}

#[tokio::test]
async fn test_affiliate_link_slug_must_be_unique_and_valid() {
    let repo = Arc::new(MockRepo::new().with_link("partner", "https://partner.example"));
    let state = state_for(repo, Some(common::admin()));

    let invalid = admin::create_affiliate_link(
        State(state.clone()),
        Json(CreateAffiliateLinkRequest {
            slug: "Bad Slug".to_string(),
            destination_url: "https://x.example".to_string(),
            description: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let duplicate = admin::create_affiliate_link(
        State(state),
        Json(CreateAffiliateLinkRequest {
            slug: "partner".to_string(),
            destination_url: "https://x.example".to_string(),
            description: None,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

// --- Users & Roles ---

#[tokio::test]
async fn test_assign_role_is_idempotent() {
    let repo = Arc::new(MockRepo::new().with_user(&reader(), &[RoleSlug::User]));
    let state = state_for(repo.clone(), Some(common::admin()));

    let request = || {
        Json(AssignRoleRequest {
            role: RoleSlug::Editor,
        })
    };

    let first = admin::assign_role(admin_user(), State(state.clone()), Path(READER_ID), request())
        .await
        .unwrap();
    let second = admin::assign_role(admin_user(), State(state.clone()), Path(READER_ID), request())
        .await
        .unwrap();

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::OK);

    let Json(roles) = admin::get_user_roles(State(state), Path(READER_ID)).await.unwrap();
    assert_eq!(roles, vec![RoleSlug::Editor, RoleSlug::User]);
}

#[tokio::test]
async fn test_assign_role_to_unknown_user_is_not_found() {
    let state = state_for(Arc::new(MockRepo::new()), Some(common::admin()));

    let err = admin::assign_role(
        admin_user(),
        State(state),
        Path(READER_ID),
        Json(AssignRoleRequest {
            role: RoleSlug::Admin,
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_role() {
    let repo = Arc::new(MockRepo::new().with_user(&reader(), &[RoleSlug::Moderator]));
    let state = state_for(repo, Some(common::admin()));

    let status = admin::revoke_role(
        admin_user(),
        State(state.clone()),
        Path((READER_ID, RoleSlug::Moderator)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let again = admin::revoke_role(
        admin_user(),
        State(state),
        Path((READER_ID, RoleSlug::Moderator)),
    )
    .await
    .unwrap_err();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_cannot_revoke_own_admin_role() {
    let repo = Arc::new(MockRepo::new().with_user(&common::admin(), &[RoleSlug::Admin]));
    let state = state_for(repo.clone(), Some(common::admin()));

    let err = admin::revoke_role(admin_user(), State(state), Path((ADMIN_ID, RoleSlug::Admin)))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    assert!(repo.roles.lock().unwrap()[&ADMIN_ID].contains(&RoleSlug::Admin));
}

// --- Dashboard & moderation ---

#[tokio::test]
async fn test_dashboard_counts() {
    let post = published_post("live");
    let repo = Arc::new(
        MockRepo::new()
            .with_user(&reader(), &[])
            .with_post(post.clone())
            .with_post(draft_post("draft"))
            .with_comment(1, post.id, READER_ID),
    );
    let state = state_for(repo, Some(common::admin()));

    let Json(stats) = admin::get_dashboard(State(state)).await.unwrap();

    assert_eq!(stats.total_posts, 2);
    assert_eq!(stats.published_posts, 1);
    assert_eq!(stats.total_users, 1);
    assert_eq!(stats.total_comments, 1);
}

#[tokio::test]
async fn test_force_delete_comment() {
    let post = published_post("thread");
    let repo = Arc::new(MockRepo::new().with_post(post.clone()).with_comment(3, post.id, READER_ID));
    let state = state_for(repo.clone(), Some(common::admin()));

    let status = admin::delete_comment(admin_user(), State(state.clone()), Path(3))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let missing = admin::delete_comment(admin_user(), State(state), Path(3))
        .await
        .unwrap_err();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
