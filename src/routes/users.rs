use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Users Router Module
///
/// Account introspection endpoints. The listing is ADMIN-gated inside its
/// handler; `/users/me` only needs a valid token.
pub fn routes() -> Router<AppState> {
    Router::new()
        // GET /users?offset=...&limit=...
        // Paginated account listing, ADMIN only.
        .route("/users", get(handlers::users::read_users))
        // GET /users/me
        // The requesting user's own record.
        .route("/users/me", get(handlers::users::get_me))
}
