//! Authentication module for JWT sessions with Google OAuth login.
//!
//! This module provides:
//! - JWT token creation and validation
//! - Google OAuth flow for user login, keeping the Google tokens needed to
//!   create calendar events on the user's behalf
//! - `require_auth` middleware for protecting routes
//! - Optional email allowlist validation

pub mod google;
mod handlers;
mod jwt;
mod middleware;
pub mod types;

pub use handlers::{auth_callback, auth_login, auth_logout, auth_me};
pub use jwt::create_token;
pub use middleware::{build_auth_cookie, clear_auth_cookie, extract_auth_user, require_auth};
pub use types::{AuthConfig, AuthUser};

#[cfg(test)]
pub(crate) fn test_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key-for-testing-only".to_string(),
        allowed_emails: vec!["test@example.com".to_string(), "a@example.com".to_string()],
        token_duration_days: 7,
        cookie_name: "auth_token".to_string(),
        google_client_id: "test".to_string(),
        google_client_secret: "test".to_string(),
        auth_redirect_uri: "http://localhost/callback".to_string(),
        token_url: types::GOOGLE_TOKEN_URL.to_string(),
        userinfo_url: types::GOOGLE_USERINFO_URL.to_string(),
        secure_cookies: false,
    }
}
