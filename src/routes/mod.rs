/// Router Module Index
///
/// Organizes the application's routing logic into one module per resource,
/// mirroring the handler modules. Access control lives in the handlers (the
/// `AuthUser` extractor plus the role and ownership guards), so a router
/// here only declares the HTTP surface.

pub mod auth;
pub mod comments;
pub mod feedbacks;
pub mod posts;
pub mod users;
