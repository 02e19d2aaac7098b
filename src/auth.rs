use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::ApiError,
    models::{Role, User, current_unix_timestamp},
    repository::RepositoryState,
};

/// Tokens expire 30 days after issuance.
pub const TOKEN_TTL_SECS: i64 = 60 * 60 * 24 * 30;

/// Sanitized user record embedded in the token payload. The password digest
/// never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: String,
    pub name: String,
    pub role: Role,
}

/// Claims
///
/// Payload structure signed into every bearer token. Validity is determined
/// by the signature, the expiry, and the embedded user still existing in the
/// store at verification time.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    /// Issued At: timestamp when the token was signed.
    pub iat: i64,
    /// Expiration Time: timestamp after which the token must not be accepted.
    pub exp: i64,
}

/// Serializes the user into claims and signs them with the configured secret
/// and algorithm.
pub fn issue_token(user: &User, config: &AppConfig) -> Result<String, ApiError> {
    let now = current_unix_timestamp();
    let claims = Claims {
        user: TokenUser {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        },
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };
    encode(
        &Header::new(config.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token encoding failed: {:?}", e);
        ApiError::Internal
    })
}

/// Decodes and verifies a bearer token. Fails with 401 when the signature is
/// invalid, the payload does not parse into [`Claims`], the algorithm does
/// not match, or the token has expired.
pub fn verify_token(token: &str, config: &AppConfig) -> Result<Claims, ApiError> {
    let validation = Validation::new(config.jwt_algorithm);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Token is not valid".to_string()))
}

/// One-way Argon2id hash of a plain-text password.
pub fn hash_password(plain: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("password hashing failed: {:?}", e);
            ApiError::Internal
        })
}

/// Verifies a plain-text password against a stored digest. A malformed
/// digest counts as a failed verification, not an error.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// AuthUser
///
/// The resolved identity of an authenticated request: the freshly-loaded
/// user record, not the stale token claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// AuthUser Extractor Implementation
///
/// Implements axum's `FromRequestParts`, making `AuthUser` usable as a
/// function argument in any protected handler. The flow:
/// 1. Pull `RepositoryState` and `AppConfig` from the application state.
/// 2. Extract the bearer token from the `Authorization` header.
/// 3. Verify signature, shape and expiry via [`verify_token`].
/// 4. Re-fetch the user from the store, so role/name changes since issuance
///    are honored and tokens of deleted users stop working.
///
/// Rejection: 401 Unauthorized on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let claims = verify_token(token, &config)?;

        let user = repo
            .get_user(&claims.user.id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("User does not exist".to_string()))?;

        Ok(AuthUser(user))
    }
}

/// Role guard: 403 unless the user's role is in the allowed set.
pub fn authorize(user: &User, allowed_roles: &[Role]) -> Result<(), ApiError> {
    if allowed_roles.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::Forbidden("User does not authorized".to_string()))
    }
}

/// Ownership guard for mutation endpoints: ADMIN bypasses, everyone else
/// must own the resource.
pub fn authorize_owner(user: &User, owner_id: &str) -> Result<(), ApiError> {
    if user.role == Role::Admin || user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("User does not authorized".to_string()))
    }
}
