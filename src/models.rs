use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::pagination::{Link, Pagination};

/// Unix-seconds timestamp used for every `created_at`/`updated_at` column.
pub fn current_unix_timestamp() -> i64 {
    Utc::now().timestamp()
}

// --- Core Application Schemas (Mapped to Database) ---

/// Role
///
/// The RBAC field, stored as TEXT (`ADMIN` / `COMMON`). A closed enum so an
/// unknown value in the store fails at the decode boundary instead of
/// surfacing as a runtime cast error in a handler.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema, Default,
)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    Common,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "ADMIN"),
            Role::Common => write!(f, "COMMON"),
        }
    }
}

/// User
///
/// Canonical identity record from the `user` table. The `password` column
/// holds the Argon2id digest, never the plain text, and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct User {
    // Primary key, chosen by the user at signup (1-50 chars).
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Post record from the `post` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    // FK to user.id (owner). Mutation is restricted to the owner or ADMIN.
    pub user_id: String,
    pub created_at: i64,
    pub updated_at: i64,
    // Author name, loaded via a JOIN in the repository list/get queries.
    #[sqlx(default)]
    pub user_name: Option<String>,
}

/// Comment record from the `comment` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    #[sqlx(default)]
    pub user_name: Option<String>,
}

/// Like/dislike record from the `feedback_post` table.
/// At most one row per (post, user) pair, enforced by a UNIQUE constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct PostFeedback {
    pub id: i64,
    pub post_id: i64,
    pub user_id: String,
    /// Maps SQL column "like" to Rust field "is_like".
    /// `like` is a reserved keyword in Rust (and in SQL, where it is quoted).
    #[sqlx(rename = "like")]
    #[serde(rename = "like")]
    pub is_like: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[sqlx(default)]
    pub user_name: Option<String>,
}

/// Like/dislike record from the `feedback_comment` table, mirror of
/// [`PostFeedback`] keyed on (comment, user).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct CommentFeedback {
    pub id: i64,
    pub comment_id: i64,
    pub user_id: String,
    #[sqlx(rename = "like")]
    #[serde(rename = "like")]
    pub is_like: bool,
    pub created_at: i64,
    pub updated_at: i64,
    #[sqlx(default)]
    pub user_name: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// Input payload for POST /auth/signup.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 50))]
    pub id: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Form body for POST /auth/signin (OAuth2 password-style form fields).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SigninForm {
    pub username: String,
    pub password: String,
}

/// Input payload for POST /posts and PUT /posts/{id} (full replace).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostBody {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    pub content: String,
}

/// Partial-update payload for PATCH /posts/{id}.
///
/// Only fields present in the request body are applied; absent fields leave
/// the stored value untouched ("exclude unset" semantics).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Input payload for POST /comments.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub post_id: i64,
    #[validate(length(min = 1, max = 300))]
    pub content: String,
}

/// Input payload for PUT /comments/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    #[validate(length(min = 1, max = 300))]
    pub content: String,
}

// --- Response Envelopes (Output Schemas) ---
//
// The wire format uses camelCase aliasing and, for reads, a
// `{pagination, data, links}` envelope with hypermedia `{rel, href}` links.

/// Embedded author reference. `name` is omitted in the few responses that
/// only carry the id (feedback create/update).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Embedded post reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostRef {
    pub id: i64,
}

/// Embedded comment reference.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentRef {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct SignupResponse {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Output schema for GET /users/me.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct MeResponse {
    pub id: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct UserListResponse {
    pub pagination: Pagination,
    pub data: Vec<UserData>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostData {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub user: UserRef,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostResponse {
    pub data: PostData,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostListResponse {
    pub pagination: Pagination,
    pub data: Vec<PostData>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentData {
    pub id: i64,
    pub content: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub post: PostRef,
    pub user: UserRef,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentResponse {
    pub data: CommentData,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentListResponse {
    pub pagination: Pagination,
    pub data: Vec<CommentData>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostFeedbackData {
    pub id: i64,
    #[serde(rename = "like")]
    pub is_like: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub post: PostRef,
    pub user: UserRef,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostFeedbackResponse {
    pub data: PostFeedbackData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct PostFeedbackListResponse {
    pub pagination: Pagination,
    pub data: Vec<PostFeedbackData>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommentFeedbackData {
    pub id: i64,
    #[serde(rename = "like")]
    pub is_like: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub comment: CommentRef,
    pub user: UserRef,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentFeedbackResponse {
    pub data: CommentFeedbackData,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct CommentFeedbackListResponse {
    pub pagination: Pagination,
    pub data: Vec<CommentFeedbackData>,
    pub links: Vec<Link>,
}
