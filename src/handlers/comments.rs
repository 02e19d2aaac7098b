use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, authorize, authorize_owner},
    error::ApiError,
    models::{
        Comment, CommentData, CommentListResponse, CommentResponse, CreateCommentRequest, PostRef,
        Role, UpdateCommentRequest, UserRef, current_unix_timestamp,
    },
    pagination::{Link, PageParams, Pagination, api_prefix, pagination_links},
};

/// CommentFilter
///
/// Optional scoping of the comment listing to a single post
/// (GET /comments?post_id=...).
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CommentFilter {
    pub post_id: Option<i64>,
}

fn comment_data(comment: Comment, prefix: &str) -> CommentData {
    let id = comment.id;
    CommentData {
        id,
        content: comment.content,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
        post: PostRef {
            id: comment.post_id,
        },
        user: UserRef {
            id: comment.user_id,
            name: comment.user_name,
        },
        links: vec![
            Link::new("self", format!("{prefix}/comments/{id}")),
            Link::new("post", format!("{prefix}/posts/{}", comment.post_id)),
        ],
    }
}

/// create_comment
///
/// [Authenticated Route] Adds a comment to an existing post; a missing
/// target post is a 404, not a foreign-key error. Answers 201 with a
/// `Location` header.
#[utoipa::path(
    post,
    path = "/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment Created", body = CommentResponse),
        (status = 404, description = "Post Not Found"),
        (status = 422, description = "Invalid Payload")
    )
)]
pub async fn create_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    payload.validate()?;

    if state.repo.get_post(payload.post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let mut comment = state
        .repo
        .create_comment(payload.post_id, &payload.content, &user.id)
        .await?;
    comment.user_name = Some(user.name);

    let prefix = api_prefix(&uri);
    let location = format!("{prefix}/comments/{}", comment.id);
    let data = comment_data(comment, prefix);
    let links = vec![Link::new("self", location.clone())];

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(CommentResponse { data, links }),
    ))
}

/// read_comments
///
/// [Public Route] Paginated comment listing, optionally filtered by post.
#[utoipa::path(
    get,
    path = "/comments",
    params(PageParams, CommentFilter),
    responses((status = 200, description = "Comments", body = CommentListResponse))
)]
pub async fn read_comments(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(filter): Query<CommentFilter>,
) -> Result<Json<CommentListResponse>, ApiError> {
    page.validate()?;

    let comments = state
        .repo
        .list_comments(filter.post_id, page.offset, page.limit)
        .await?;
    let total = state.repo.count_comments(filter.post_id).await?;

    let prefix = api_prefix(&uri);
    Ok(Json(CommentListResponse {
        pagination: Pagination {
            offset: page.offset,
            limit: page.limit,
            total,
        },
        data: comments
            .into_iter()
            .map(|c| comment_data(c, prefix))
            .collect(),
        links: pagination_links(page.offset, page.limit, total, &uri),
    }))
}

/// read_comment
///
/// [Public Route] Single comment by id.
#[utoipa::path(
    get,
    path = "/comments/{id}",
    responses(
        (status = 200, description = "Comment", body = CommentResponse),
        (status = 404, description = "Not Found")
    )
)]
pub async fn read_comment(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
) -> Result<Json<CommentResponse>, ApiError> {
    let comment = state
        .repo
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    let prefix = api_prefix(&uri);
    let data = comment_data(comment, prefix);
    let links = vec![Link::new("self", format!("{prefix}/comments/{id}"))];
    Ok(Json(CommentResponse { data, links }))
}

/// update_comment
///
/// [Authenticated Route] Replaces a comment's content. Owner or ADMIN only.
#[utoipa::path(
    put,
    path = "/comments/{id}",
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment Updated", body = CommentResponse),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    payload.validate()?;

    let mut comment = state
        .repo
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    authorize_owner(&user, &comment.user_id)?;

    comment.content = payload.content;
    comment.updated_at = current_unix_timestamp();
    state.repo.update_comment(&comment).await?;

    let prefix = api_prefix(&uri);
    let data = comment_data(comment, prefix);
    let links = vec![Link::new("self", format!("{prefix}/comments/{id}"))];
    Ok(Json(CommentResponse { data, links }))
}

/// delete_comment
///
/// [Authenticated Route] Removes a comment. Owner or ADMIN only.
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;

    let comment = state
        .repo
        .get_comment(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;
    authorize_owner(&user, &comment.user_id)?;

    state.repo.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
