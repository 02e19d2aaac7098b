use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Comments Router Module
///
/// Same shape as the posts router; the listing additionally accepts a
/// `post_id` filter.
pub fn routes() -> Router<AppState> {
    Router::new()
        // GET  /comments?post_id=...&offset=...&limit=...
        // POST /comments
        .route(
            "/comments",
            get(handlers::comments::read_comments).post(handlers::comments::create_comment),
        )
        // GET    /comments/{id}
        // PUT    /comments/{id}
        // DELETE /comments/{id}
        .route(
            "/comments/{id}",
            get(handlers::comments::read_comment)
                .put(handlers::comments::update_comment)
                .delete(handlers::comments::delete_comment),
        )
}
