use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Auth Router Module
///
/// The identity flow: account creation and token issuance. Both endpoints
/// are unauthenticated by nature.
pub fn routes() -> Router<AppState> {
    Router::new()
        // POST /auth/signup
        // Registers a new COMMON-role account; the chosen id is the key.
        .route("/auth/signup", post(handlers::auth::signup))
        // POST /auth/signin
        // Exchanges form credentials for a 30-day bearer token.
        .route("/auth/signin", post(handlers::auth::signin))
}
