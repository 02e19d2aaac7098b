use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod repository;

// Module for routing, one file per resource.
pub mod routes;

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{RepositoryState, SqliteRepository};

/// The JSON:API-style media type required on the versioned (`/v1`) mount.
pub const JSON_API_MEDIA_TYPE: &str = "application/vnd.api+json";

/// ApiDoc
///
/// This struct auto-generates the OpenAPI documentation (Swagger JSON) for the application.
/// It aggregates all API paths and data schemas that have been decorated with
/// the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]` macros.
/// The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    // List all public handler functions here for documentation generation.
    paths(
        handlers::healthcheck,
        handlers::auth::signup, handlers::auth::signin,
        handlers::users::read_users, handlers::users::get_me,
        handlers::posts::create_post, handlers::posts::read_posts, handlers::posts::read_post,
        handlers::posts::update_post, handlers::posts::patch_post, handlers::posts::delete_post,
        handlers::comments::create_comment, handlers::comments::read_comments,
        handlers::comments::read_comment, handlers::comments::update_comment,
        handlers::comments::delete_comment,
        handlers::feedbacks::create_or_update_post_feedback,
        handlers::feedbacks::read_post_feedbacks, handlers::feedbacks::delete_post_feedback,
        handlers::feedbacks::create_or_update_comment_feedback,
        handlers::feedbacks::read_comment_feedbacks, handlers::feedbacks::delete_comment_feedback,
    ),
    // List all models (schemas) used in the request/response bodies.
    components(
        schemas(
            models::Role, models::SignupRequest, models::SignupResponse, models::SigninForm,
            models::SigninResponse, models::MeResponse, models::UserData, models::UserListResponse,
            models::PostBody, models::PostPatch, models::PostData, models::PostResponse,
            models::PostListResponse, models::CreateCommentRequest, models::UpdateCommentRequest,
            models::CommentData, models::CommentResponse, models::CommentListResponse,
            models::PostFeedbackData, models::PostFeedbackResponse,
            models::PostFeedbackListResponse, models::CommentFeedbackData,
            models::CommentFeedbackResponse, models::CommentFeedbackListResponse,
            models::UserRef, models::PostRef, models::CommentRef,
            pagination::Pagination, pagination::Link,
        )
    ),
    tags(
        (name = "blog-api", description = "Blog REST API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe, and immutable
/// container holding all essential application services and configuration.
/// The application state is shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Abstracts database access via the SqlitePool connection.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These implementations allow extractors to selectively pull components from
// the shared AppState, which is what lets `AuthUser` resolve the repository
// and the token secret without the handler passing them along.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_json_api
///
/// Middleware guarding the versioned (`/v1`) mount: requests must announce
/// `Accept: application/vnd.api+json` or they are rejected with 406 before
/// any handler runs. The unversioned mount carries no such requirement.
async fn require_json_api(request: Request, next: Next) -> Response {
    let accepted = request
        .headers()
        .get(axum::http::header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains(JSON_API_MEDIA_TYPE));

    if !accepted {
        return ApiError::NotAcceptable(format!("only {JSON_API_MEDIA_TYPE} is acceptable"))
            .into_response();
    }
    next.run(request).await
}

/// The full API surface, assembled from the per-resource routers. Mounted
/// twice by [`create_router`]: once at the root and once under `/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Used for monitoring and load balancer checks.
        .route("/", axum::routing::get(handlers::healthcheck))
        .merge(routes::auth::routes())
        .merge(routes::users::routes())
        .merge(routes::posts::routes())
        .merge(routes::comments::routes())
        .merge(routes::feedbacks::routes())
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped middleware,
/// and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let api = api_routes();

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Unversioned mount: the API as-is, no media-type requirement.
        .merge(api.clone())
        // Versioned mount: the same API behind the JSON:API Accept check.
        // Handlers build embedded links from `OriginalUri`, so hrefs keep
        // the /v1 prefix on this mount automatically.
        .nest("/v1", api.layer(middleware::from_fn(require_json_api)))
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: Generates a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: Wraps the entire request/response lifecycle in a tracing span.
                // Uses the `trace_span_logger` to include the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: Ensures the generated x-request-id header is
                // returned to the client and injected into subsequent service calls.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer (Applied last, allowing all traffic in/out after processing)
        .layer(cors)
}

/// trace_span_logger
///
/// Helper function used by `TraceLayer` to customize the tracing span creation.
/// It extracts the `x-request-id` header (if present) and includes it in the
/// structured logging metadata alongside the HTTP method and URI.
///
/// *Goal*: Ensure every log line for a single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    // The structured log format used by the tracing macros.
    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
