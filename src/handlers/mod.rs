// Resource handlers, one module per resource. Each handler composes the
// auth extractor/guards, the repository and the pagination helper, and
// surfaces the first failure it meets as an `ApiError`.

pub mod auth;
pub mod comments;
pub mod feedbacks;
pub mod posts;
pub mod users;

/// healthcheck
///
/// [Public Route] Used by monitoring and load-balancer checks.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "API server is alive", body = String))
)]
pub async fn healthcheck() -> &'static str {
    "I'm Alive!"
}
