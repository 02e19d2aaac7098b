use std::env;

use jsonwebtoken::Algorithm;

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded,
/// shared across all requests via the application state (`FromRef`).
#[derive(Clone)]
pub struct AppConfig {
    // Database connection string (SQLite url, e.g. "sqlite://blog.db?mode=rwc").
    pub db_url: String,
    // Secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    // HMAC signing algorithm. Tokens signed with anything else are rejected.
    pub jwt_algorithm: Algorithm,
    // Runtime environment marker. Controls log formatting.
    pub env: Env,
}

/// Runtime context: switches between developer-friendly output (Local)
/// and aggregator-friendly output (Production).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking config instance for test setup, so tests do not
    /// have to populate environment variables.
    fn default() -> Self {
        Self {
            db_url: "sqlite::memory:".to_string(),
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            jwt_algorithm: Algorithm::HS256,
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// The canonical startup initializer. Reads everything from environment
    /// variables and fails fast on missing critical values.
    ///
    /// # Panics
    /// Panics if `DATABASE_URL` is unset, if `JWT_SECRET_KEY` is unset in
    /// production, or if `JWT_ALGORITHM` names an unknown algorithm.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The production signing secret is mandatory and must be explicit.
        let jwt_secret = match env {
            Env::Production => env::var("JWT_SECRET_KEY")
                .expect("FATAL: JWT_SECRET_KEY must be set in production."),
            _ => env::var("JWT_SECRET_KEY")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        // Parsed here so a typo'd algorithm kills the process at startup
        // instead of failing every signin. Only the HMAC family is valid
        // with a shared-secret key.
        let jwt_algorithm = match env::var("JWT_ALGORITHM") {
            Ok(name) => match name.as_str() {
                "HS256" => Algorithm::HS256,
                "HS384" => Algorithm::HS384,
                "HS512" => Algorithm::HS512,
                _ => panic!("FATAL: unsupported JWT_ALGORITHM {name:?}"),
            },
            Err(_) => Algorithm::HS256,
        };

        Self {
            db_url: env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required"),
            jwt_secret,
            jwt_algorithm,
            env,
        }
    }
}
