use axum::{
    Json,
    extract::{OriginalUri, Query, State},
};
use validator::Validate;

use crate::{
    AppState,
    auth::{AuthUser, authorize},
    error::ApiError,
    models::{MeResponse, Role, UserData, UserListResponse},
    pagination::{PageParams, Pagination, pagination_links},
};

/// read_users
///
/// [Admin Route] Paginated listing of every registered account. Only the
/// public fields (`id`, `name`) are exposed.
#[utoipa::path(
    get,
    path = "/users",
    params(PageParams),
    responses(
        (status = 200, description = "Users", body = UserListResponse),
        (status = 401, description = "Not Authenticated"),
        (status = 403, description = "Not Admin")
    )
)]
pub async fn read_users(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageParams>,
) -> Result<Json<UserListResponse>, ApiError> {
    authorize(&user, &[Role::Admin])?;
    page.validate()?;

    let users = state.repo.list_users(page.offset, page.limit).await?;
    let total = state.repo.count_users().await?;

    Ok(Json(UserListResponse {
        pagination: Pagination {
            offset: page.offset,
            limit: page.limit,
            total,
        },
        data: users
            .into_iter()
            .map(|u| UserData {
                id: u.id,
                name: u.name,
            })
            .collect(),
        links: pagination_links(page.offset, page.limit, total, &uri),
    }))
}

/// get_me
///
/// [Authenticated Route] Returns the requesting user's own record, as
/// resolved by the `AuthUser` extractor (store state, not token claims).
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current User", body = MeResponse),
        (status = 401, description = "Not Authenticated")
    )
)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.id,
        name: user.name,
        role: user.role,
    })
}
