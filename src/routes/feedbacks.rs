use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Feedbacks Router Module
///
/// Like/dislike endpoints for posts and comments. The vote kind rides in
/// the path rather than the body, so a vote is an idempotent resource
/// address, not a payload to validate.
pub fn routes() -> Router<AppState> {
    Router::new()
        // GET /feedbacks/posts?post_id=...&offset=...&limit=...
        .route(
            "/feedbacks/posts",
            get(handlers::feedbacks::read_post_feedbacks),
        )
        // POST /feedbacks/posts/{id}/{like_or_dislike}
        // 201 on first vote, 200 when the existing vote is overwritten.
        .route(
            "/feedbacks/posts/{id}/{like_or_dislike}",
            post(handlers::feedbacks::create_or_update_post_feedback),
        )
        // DELETE /feedbacks/posts/{id}
        .route(
            "/feedbacks/posts/{id}",
            delete(handlers::feedbacks::delete_post_feedback),
        )
        // GET /feedbacks/comments?comment_id=...&offset=...&limit=...
        .route(
            "/feedbacks/comments",
            get(handlers::feedbacks::read_comment_feedbacks),
        )
        // POST /feedbacks/comments/{id}/{like_or_dislike}
        .route(
            "/feedbacks/comments/{id}/{like_or_dislike}",
            post(handlers::feedbacks::create_or_update_comment_feedback),
        )
        // DELETE /feedbacks/comments/{id}
        .route(
            "/feedbacks/comments/{id}",
            delete(handlers::feedbacks::delete_comment_feedback),
        )
}
