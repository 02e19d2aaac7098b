use axum::{Form, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::{
    AppState,
    auth::{hash_password, issue_token, verify_password},
    error::ApiError,
    models::{SigninForm, SigninResponse, SignupRequest, SignupResponse, User, current_unix_timestamp},
};

/// signup
///
/// [Public Route] Registers a new account with the COMMON role. The chosen
/// id doubles as the primary key, so a taken id is a 409, and the password
/// is stored only as an Argon2id digest.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User Created", body = SignupResponse),
        (status = 409, description = "Id Already Taken"),
        (status = 422, description = "Invalid Payload")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    payload.validate()?;

    if state.repo.get_user(&payload.id).await?.is_some() {
        return Err(ApiError::Conflict("User already exist".to_string()));
    }

    let now = current_unix_timestamp();
    let user = User {
        id: payload.id,
        name: payload.name,
        password: hash_password(&payload.password)?,
        role: Default::default(),
        created_at: now,
        updated_at: now,
    };
    state.repo.create_user(&user).await?;

    tracing::info!(user_id = %user.id, "new user signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            name: user.name,
        }),
    ))
}

/// signin
///
/// [Public Route] Exchanges form credentials for a signed bearer token.
/// Accepts an OAuth2 password-style form (`username` / `password`).
///
/// Both an unknown id and a wrong password answer 401, with messages that
/// distinguish the two cases.
#[utoipa::path(
    post,
    path = "/auth/signin",
    responses(
        (status = 200, description = "Token Issued", body = SigninResponse),
        (status = 401, description = "Bad Credentials")
    )
)]
pub async fn signin(
    State(state): State<AppState>,
    Form(form): Form<SigninForm>,
) -> Result<Json<SigninResponse>, ApiError> {
    let user = state
        .repo
        .get_user(&form.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()))?;

    if !verify_password(&form.password, &user.password) {
        return Err(ApiError::Unauthorized("Password is incorrect".to_string()));
    }

    let access_token = issue_token(&user, &state.config)?;
    Ok(Json(SigninResponse {
        access_token,
        token_type: "Bearer".to_string(),
    }))
}
