//! Auth-related types and configuration.

use serde::{Deserialize, Serialize};

pub use shared_types::{AuthUserResponse, LoginInitResponse};

const DEV_JWT_SECRET: &str = "development_secret_do_not_use_in_production";

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,
    /// User display name from Google
    pub name: Option<String>,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Validated user from JWT. The email doubles as the chat owner id.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub name: Option<String>,
}

impl AuthUser {
    pub fn user_id(&self) -> &str {
        &self.email
    }
}

/// Auth configuration loaded from environment
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Empty means any Google account may sign in.
    pub allowed_emails: Vec<String>,
    pub token_duration_days: i64,
    pub cookie_name: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub auth_redirect_uri: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub secure_cookies: bool,
}

impl AuthConfig {
    /// Load auth configuration from environment variables.
    ///
    /// Required env vars:
    /// - `GOOGLE_CLIENT_ID`, `GOOGLE_CLIENT_SECRET`: Google OAuth client
    /// - `AUTH_REDIRECT_URI`: OAuth callback URI for user login
    ///
    /// Optional:
    /// - `JWT_SECRET`: falls back to a development secret with a warning
    /// - `ALLOWED_EMAILS`: comma-separated allowlist
    /// - `RUST_ENV=production`: mark cookies `Secure`
    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ => {
                tracing::warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let allowed_emails = std::env::var("ALLOWED_EMAILS")
            .map(|list| parse_allowlist(&list))
            .unwrap_or_default();

        Ok(Self {
            jwt_secret,
            allowed_emails,
            token_duration_days: 7,
            cookie_name: "auth_token".to_string(),
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")
                .map_err(|_| "GOOGLE_CLIENT_ID must be set".to_string())?,
            google_client_secret: std::env::var("GOOGLE_CLIENT_SECRET")
                .map_err(|_| "GOOGLE_CLIENT_SECRET must be set".to_string())?,
            auth_redirect_uri: std::env::var("AUTH_REDIRECT_URI")
                .map_err(|_| "AUTH_REDIRECT_URI must be set".to_string())?,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            secure_cookies: std::env::var("RUST_ENV").unwrap_or_default() == "production",
        })
    }

    /// Check if an email address may use the service.
    pub fn is_email_allowed(&self, email: &str) -> bool {
        self.allowed_emails.is_empty() || self.allowed_emails.contains(&email.to_lowercase())
    }
}

fn parse_allowlist(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_parsing_normalizes_case_and_blanks() {
        assert_eq!(
            parse_allowlist(" A@Example.com, ,b@example.com "),
            vec!["a@example.com".to_string(), "b@example.com".to_string()]
        );
    }

    #[test]
    fn empty_allowlist_admits_everyone() {
        let mut config = crate::auth::test_config();
        config.allowed_emails.clear();
        assert!(config.is_email_allowed("anyone@example.org"));

        config.allowed_emails = vec!["a@example.com".into()];
        assert!(config.is_email_allowed("A@example.com"));
        assert!(!config.is_email_allowed("b@example.com"));
    }
}
