use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, Uri, header},
    response::IntoResponse,
};
use blog_api::{
    AppConfig, AppState,
    auth::{AuthUser, hash_password},
    handlers,
    models::{PostBody, PostPatch, Role, User, current_unix_timestamp},
    repository::{Repository, RepositoryState, SqliteRepository},
};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite");
    SqliteRepository::create_schema(&pool)
        .await
        .expect("Failed to create schema");

    AppState {
        repo: Arc::new(SqliteRepository::new(pool)) as RepositoryState,
        config: AppConfig::default(),
    }
}

async fn seed_user(state: &AppState, id: &str, role: Role) -> User {
    let now = current_unix_timestamp();
    let user = User {
        id: id.to_string(),
        name: id.to_string(),
        password: hash_password("1234").expect("hashing failed"),
        role,
        created_at: now,
        updated_at: now,
    };
    state.repo.create_user(&user).await.expect("seed failed");
    user
}

fn uri(path: &str) -> OriginalUri {
    OriginalUri(path.parse::<Uri>().unwrap())
}

#[tokio::test]
async fn create_post_returns_201_with_location() {
    let state = test_state().await;
    let user = seed_user(&state, "heumsi", Role::Common).await;

    let response = handlers::posts::create_post(
        AuthUser(user),
        State(state.clone()),
        uri("/posts"),
        Json(PostBody {
            title: "first post".to_string(),
            content: "hello".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response();

    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(location.starts_with("/posts/"));
}

#[tokio::test]
async fn patch_post_only_touches_present_fields() {
    let state = test_state().await;
    let user = seed_user(&state, "heumsi", Role::Common).await;
    let post = state
        .repo
        .create_post("original title", "original body", "heumsi")
        .await
        .unwrap();

    let Json(response) = handlers::posts::patch_post(
        AuthUser(user),
        State(state.clone()),
        uri(&format!("/posts/{}", post.id)),
        Path(post.id),
        Json(PostPatch {
            title: None,
            content: Some("patched body".to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.data.title, "original title");
    assert_eq!(response.data.content, "patched body");
}

#[tokio::test]
async fn update_post_by_a_stranger_is_forbidden() {
    let state = test_state().await;
    seed_user(&state, "heumsi", Role::Common).await;
    let stranger = seed_user(&state, "jaden", Role::Common).await;
    let post = state
        .repo
        .create_post("mine", "body", "heumsi")
        .await
        .unwrap();

    let err = handlers::posts::update_post(
        AuthUser(stranger),
        State(state.clone()),
        uri(&format!("/posts/{}", post.id)),
        Path(post.id),
        Json(PostBody {
            title: "hijacked".to_string(),
            content: "body".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    // The row is untouched.
    let unchanged = state.repo.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(unchanged.title, "mine");
}

#[tokio::test]
async fn admin_can_delete_someone_elses_post() {
    let state = test_state().await;
    seed_user(&state, "heumsi", Role::Common).await;
    let admin = seed_user(&state, "admin", Role::Admin).await;
    let post = state
        .repo
        .create_post("mine", "body", "heumsi")
        .await
        .unwrap();

    let status = handlers::posts::delete_post(AuthUser(admin), State(state.clone()), Path(post.id))
        .await
        .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.repo.get_post(post.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_missing_post_is_404() {
    let state = test_state().await;
    let user = seed_user(&state, "heumsi", Role::Common).await;

    let err = handlers::posts::delete_post(AuthUser(user), State(state.clone()), Path(999))
        .await
        .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn feedback_vote_then_flip() {
    let state = test_state().await;
    let user = seed_user(&state, "heumsi", Role::Common).await;
    let post = state
        .repo
        .create_post("a", "body", "heumsi")
        .await
        .unwrap();

    // First vote inserts.
    let response = handlers::feedbacks::create_or_update_post_feedback(
        AuthUser(user.clone()),
        State(state.clone()),
        Path((post.id, "like".to_string())),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The flip overwrites in place and answers 200.
    let response = handlers::feedbacks::create_or_update_post_feedback(
        AuthUser(user),
        State(state.clone()),
        Path((post.id, "dislike".to_string())),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let rows = state
        .repo
        .list_post_feedbacks(Some(post.id), 0, 100)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_like);
}

#[tokio::test]
async fn feedback_kind_must_be_like_or_dislike() {
    let state = test_state().await;
    let user = seed_user(&state, "heumsi", Role::Common).await;
    let post = state
        .repo
        .create_post("a", "body", "heumsi")
        .await
        .unwrap();

    let err = handlers::feedbacks::create_or_update_post_feedback(
        AuthUser(user),
        State(state.clone()),
        Path((post.id, "meh".to_string())),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn feedback_on_a_missing_post_is_404() {
    let state = test_state().await;
    let user = seed_user(&state, "heumsi", Role::Common).await;

    let err = handlers::feedbacks::create_or_update_post_feedback(
        AuthUser(user),
        State(state.clone()),
        Path((42, "like".to_string())),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let state = test_state().await;
    let common = seed_user(&state, "heumsi", Role::Common).await;
    let admin = seed_user(&state, "admin", Role::Admin).await;

    let err = handlers::users::read_users(
        AuthUser(common),
        State(state.clone()),
        uri("/users"),
        axum::extract::Query(Default::default()),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), StatusCode::FORBIDDEN);

    let Json(response) = handlers::users::read_users(
        AuthUser(admin),
        State(state.clone()),
        uri("/users"),
        axum::extract::Query(Default::default()),
    )
    .await
    .unwrap();
    assert_eq!(response.pagination.total, 2);
    assert_eq!(response.data.len(), 2);
}
