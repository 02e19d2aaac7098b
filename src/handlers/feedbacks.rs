use axum::{
    Json,
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, authorize, authorize_owner},
    error::ApiError,
    models::{
        CommentFeedback, CommentFeedbackData, CommentFeedbackListResponse,
        CommentFeedbackResponse, CommentRef, PostFeedback, PostFeedbackData,
        PostFeedbackListResponse, PostFeedbackResponse, PostRef, Role, UserRef,
    },
    pagination::{Link, PageParams, Pagination, api_prefix, pagination_links},
};

/// PostFeedbackFilter
///
/// Optional scoping of the post-feedback listing to a single post.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PostFeedbackFilter {
    pub post_id: Option<i64>,
}

/// CommentFeedbackFilter
///
/// Optional scoping of the comment-feedback listing to a single comment.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CommentFeedbackFilter {
    pub comment_id: Option<i64>,
}

/// Parses the trailing path segment of the feedback create routes. Anything
/// other than the two literals is a 422.
fn parse_like(segment: &str) -> Result<bool, ApiError> {
    match segment {
        "like" => Ok(true),
        "dislike" => Ok(false),
        other => Err(ApiError::Validation(format!(
            "expected 'like' or 'dislike', got '{other}'"
        ))),
    }
}

fn post_feedback_data(feedback: PostFeedback, links: Vec<Link>) -> PostFeedbackData {
    PostFeedbackData {
        id: feedback.id,
        is_like: feedback.is_like,
        created_at: feedback.created_at,
        updated_at: feedback.updated_at,
        post: PostRef {
            id: feedback.post_id,
        },
        user: UserRef {
            id: feedback.user_id,
            name: feedback.user_name,
        },
        links,
    }
}

fn comment_feedback_data(feedback: CommentFeedback, links: Vec<Link>) -> CommentFeedbackData {
    CommentFeedbackData {
        id: feedback.id,
        is_like: feedback.is_like,
        created_at: feedback.created_at,
        updated_at: feedback.updated_at,
        comment: CommentRef {
            id: feedback.comment_id,
        },
        user: UserRef {
            id: feedback.user_id,
            name: feedback.user_name,
        },
        links,
    }
}

/// create_or_update_post_feedback
///
/// [Authenticated Route] Records the caller's like or dislike on a post.
/// One row per (post, user) pair: a first vote inserts and answers 201, a
/// repeat vote overwrites the existing row in place and answers 200. The
/// flip is a single atomic upsert, so concurrent votes from the same user
/// can never leave two rows behind.
#[utoipa::path(
    post,
    path = "/feedbacks/posts/{id}/{like_or_dislike}",
    responses(
        (status = 201, description = "Feedback Created", body = PostFeedbackResponse),
        (status = 200, description = "Feedback Updated", body = PostFeedbackResponse),
        (status = 404, description = "Post Not Found"),
        (status = 422, description = "Unknown Feedback Kind")
    )
)]
pub async fn create_or_update_post_feedback(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((post_id, like_or_dislike)): Path<(i64, String)>,
) -> Result<(StatusCode, Json<PostFeedbackResponse>), ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    let like = parse_like(&like_or_dislike)?;

    if state.repo.get_post(post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let (mut feedback, created) = state
        .repo
        .upsert_post_feedback(post_id, &user.id, like)
        .await?;
    feedback.user_name = None;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(PostFeedbackResponse {
            data: post_feedback_data(feedback, Vec::new()),
        }),
    ))
}

/// read_post_feedbacks
///
/// [Public Route] Paginated post-feedback listing, optionally filtered by
/// post.
#[utoipa::path(
    get,
    path = "/feedbacks/posts",
    params(PageParams, PostFeedbackFilter),
    responses((status = 200, description = "Post Feedbacks", body = PostFeedbackListResponse))
)]
pub async fn read_post_feedbacks(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(filter): Query<PostFeedbackFilter>,
) -> Result<Json<PostFeedbackListResponse>, ApiError> {
    page.validate()?;

    let feedbacks = state
        .repo
        .list_post_feedbacks(filter.post_id, page.offset, page.limit)
        .await?;
    let total = state.repo.count_post_feedbacks(filter.post_id).await?;

    let prefix = api_prefix(&uri);
    Ok(Json(PostFeedbackListResponse {
        pagination: Pagination {
            offset: page.offset,
            limit: page.limit,
            total,
        },
        data: feedbacks
            .into_iter()
            .map(|f| {
                let links = vec![
                    Link::new("self", format!("{prefix}/feedbacks/posts/{}", f.id)),
                    Link::new("post", format!("{prefix}/posts/{}", f.post_id)),
                ];
                post_feedback_data(f, links)
            })
            .collect(),
        links: pagination_links(page.offset, page.limit, total, &uri),
    }))
}

/// delete_post_feedback
///
/// [Authenticated Route] Withdraws a feedback row. Owner or ADMIN only.
#[utoipa::path(
    delete,
    path = "/feedbacks/posts/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_post_feedback(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;

    let feedback = state
        .repo
        .get_post_feedback(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("PostFeedback not found".to_string()))?;
    authorize_owner(&user, &feedback.user_id)?;

    state.repo.delete_post_feedback(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// create_or_update_comment_feedback
///
/// [Authenticated Route] Mirror of the post variant, keyed on
/// (comment, user).
#[utoipa::path(
    post,
    path = "/feedbacks/comments/{id}/{like_or_dislike}",
    responses(
        (status = 201, description = "Feedback Created", body = CommentFeedbackResponse),
        (status = 200, description = "Feedback Updated", body = CommentFeedbackResponse),
        (status = 404, description = "Comment Not Found"),
        (status = 422, description = "Unknown Feedback Kind")
    )
)]
pub async fn create_or_update_comment_feedback(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((comment_id, like_or_dislike)): Path<(i64, String)>,
) -> Result<impl IntoResponse, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;
    let like = parse_like(&like_or_dislike)?;

    if state.repo.get_comment(comment_id).await?.is_none() {
        return Err(ApiError::NotFound("Comment not found".to_string()));
    }

    let (mut feedback, created) = state
        .repo
        .upsert_comment_feedback(comment_id, &user.id, like)
        .await?;
    feedback.user_name = None;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(CommentFeedbackResponse {
            data: comment_feedback_data(feedback, Vec::new()),
        }),
    ))
}

/// read_comment_feedbacks
///
/// [Public Route] Paginated comment-feedback listing, optionally filtered
/// by comment.
#[utoipa::path(
    get,
    path = "/feedbacks/comments",
    params(PageParams, CommentFeedbackFilter),
    responses((status = 200, description = "Comment Feedbacks", body = CommentFeedbackListResponse))
)]
pub async fn read_comment_feedbacks(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
    Query(filter): Query<CommentFeedbackFilter>,
) -> Result<Json<CommentFeedbackListResponse>, ApiError> {
    page.validate()?;

    let feedbacks = state
        .repo
        .list_comment_feedbacks(filter.comment_id, page.offset, page.limit)
        .await?;
    let total = state.repo.count_comment_feedbacks(filter.comment_id).await?;

    let prefix = api_prefix(&uri);
    Ok(Json(CommentFeedbackListResponse {
        pagination: Pagination {
            offset: page.offset,
            limit: page.limit,
            total,
        },
        data: feedbacks
            .into_iter()
            .map(|f| {
                let links = vec![
                    Link::new("self", format!("{prefix}/feedbacks/comments/{}", f.id)),
                    Link::new("comment", format!("{prefix}/comments/{}", f.comment_id)),
                ];
                comment_feedback_data(f, links)
            })
            .collect(),
        links: pagination_links(page.offset, page.limit, total, &uri),
    }))
}

/// delete_comment_feedback
///
/// [Authenticated Route] Withdraws a feedback row. Owner or ADMIN only.
#[utoipa::path(
    delete,
    path = "/feedbacks/comments/{id}",
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Owner"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_comment_feedback(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(&user, &[Role::Admin, Role::Common])?;

    let feedback = state
        .repo
        .get_comment_feedback(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("CommentFeedback not found".to_string()))?;
    authorize_owner(&user, &feedback.user_id)?;

    state.repo.delete_comment_feedback(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
