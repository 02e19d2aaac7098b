use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Posts Router Module
///
/// Reads are public; every mutation requires a token and is owner-or-ADMIN
/// checked in its handler.
pub fn routes() -> Router<AppState> {
    Router::new()
        // GET  /posts?offset=...&limit=...
        // POST /posts
        .route(
            "/posts",
            get(handlers::posts::read_posts).post(handlers::posts::create_post),
        )
        // GET    /posts/{id}
        // PUT    /posts/{id}  full replace
        // PATCH  /posts/{id}  partial update, absent fields untouched
        // DELETE /posts/{id}
        .route(
            "/posts/{id}",
            get(handlers::posts::read_post)
                .put(handlers::posts::update_post)
                .patch(handlers::posts::patch_post)
                .delete(handlers::posts::delete_post),
        )
}
