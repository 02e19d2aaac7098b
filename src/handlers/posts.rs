use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, authorize, authorize_owner},
    error::ApiError,
    models::{
        Post, PostBody, PostData, PostListResponse, PostPatch, PostResponse, Role, UserRef,
        current_unix_timestamp,
    },
    pagination::{Link, PageParams, Pagination, api_prefix, pagination_links},
};

/// Projects a row into the wire shape, attaching the hypermedia links that
/// point at the post itself and at its comment/feedback collections.
fn post_data(post: Post, prefix: &str) -> PostData {
    let id = post.id;
    PostData {
        id,
        title: post.title,
        content: post.content,
        created_at: post.created_at,
        updated_at: post.updated_at,
        user: UserRef {
            id: post.user_id,
            name: post.user_name,
        },
        links: vec![
            Link::new("self", format!("{prefix}/posts/{id}")),
            Link::new("comments", format!("{prefix}/comments?post_id={id}")),
            Link::new("feedbacks", format!("{prefix}/feedbacks/posts?post_id={id}")),
        ],
    }
}

/// create_post
///
/// [Authenticated Route] Creates a post owned by the requesting user.
/// Answers 201 with a `Location` header pointing at the new resource.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostBody,
    responses(
        (status = 201, description = "Post Created", body = PostResponse),
        (status = 401, description = "Not Authenticated"),
        (status = 422, description = "Invalid Payload")
    )
)]
pub async fn create_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(payload): Json<PostBody>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    payload.validate()?;

    let mut post = state
        .repo
        .create_post(&payload.title, &payload.content, &user.id)
        .await?;
    post.user_name = Some(user.name);

    let prefix = api_prefix(&uri);
    let location = format!("{prefix}/posts/{}", post.id);
    let data = post_data(post, prefix);
    let links = vec![Link::new("self", location.clone())];

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(PostResponse { data, links }),
    ))
}

/// read_posts
///
/// [Public Route] Paginated listing of all posts, oldest first.
#[utoipa::path(
    get,
    path = "/posts",
    params(PageParams),
    responses((status = 200, description = "Posts", body = PostListResponse))
)]
pub async fn read_posts(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
) -> Result<Json<PostListResponse>, ApiError> {
    page.validate()?;

    let posts = state.repo.list_posts(page.offset, page.limit).await?;
    let total = state.repo.count_posts().await?;

    let prefix = api_prefix(&uri);
    Ok(Json(PostListResponse {
        pagination: Pagination {
            offset: page.offset,
            limit: page.limit,
            total,
        },
        data: posts.into_iter().map(|p| post_data(p, prefix)).collect(),
        links: pagination_links(page.offset, page.limit, total, &uri),
    }))
}

/// read_post
///
/// [Public Route] Single post by id.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    responses(
        (status = 200, description = "Post", body = PostResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn read_post(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Json<PostResponse>, ApiError> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let prefix = api_prefix(&uri);
    let data = post_data(post, prefix);
    let links = vec![Link::new("self", format!("{prefix}/posts/{id}"))];
    Ok(Json(PostResponse { data, links }))
}

/// update_post
///
/// [Authenticated Route] Full replace of a post's title and content.
///
/// *Authorization*: owner or ADMIN; everyone else gets 403 even when the
/// payload is valid.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    request_body = PostBody,
    responses(
        (status = 200, description = "Post Updated", body = PostResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Json(payload): Json<PostBody>,
) -> Result<Json<PostResponse>, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    payload.validate()?;

    let mut post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    authorize_owner(&user, &post.user_id)?;

    post.title = payload.title;
    post.content = payload.content;
    post.updated_at = current_unix_timestamp();
    state.repo.update_post(&post).await?;

    let prefix = api_prefix(&uri);
    let data = post_data(post, prefix);
    let links = vec![Link::new("self", format!("{prefix}/posts/{id}"))];
    Ok(Json(PostResponse { data, links }))
}

/// patch_post
///
/// [Authenticated Route] Partial update. Fields absent from the body keep
/// their stored values; fields present replace them.
#[utoipa::path(
    patch,
    path = "/posts/{id}",
    request_body = PostPatch,
    responses(
        (status = 200, description = "Post Updated", body = PostResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn patch_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Json(payload): Json<PostPatch>,
) -> Result<Json<PostResponse>, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    payload.validate()?;

    let mut post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    authorize_owner(&user, &post.user_id)?;

    if let Some(title) = payload.title {
        post.title = title;
    }
    if let Some(content) = payload.content {
        post.content = content;
    }
    post.updated_at = current_unix_timestamp();
    state.repo.update_post(&post).await?;

    let prefix = api_prefix(&uri);
    let data = post_data(post, prefix);
    let links = vec![Link::new("self", format!("{prefix}/posts/{id}"))];
    Ok(Json(PostResponse { data, links }))
}

/// delete_post
///
/// [Authenticated Route] Removes a post. Owner or ADMIN only.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;

    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;
    authorize_owner(&user, &post.user_id)?;

    state.repo.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
