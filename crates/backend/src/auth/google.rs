//! Google OAuth token endpoint calls and stored-token lookup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::store::{AccountRepository, GoogleTokens};

use super::types::{AuthConfig, GOOGLE_AUTH_URL};

/// Scopes requested at login: identity plus calendar write access.
pub const LOGIN_SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/calendar",
];

/// Stored access tokens this close to expiry are refreshed before use.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    pub fn into_tokens(self, now: DateTime<Utc>) -> GoogleTokens {
        GoogleTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
}

#[derive(Serialize)]
struct CodeExchange<'a> {
    code: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

/// Build the consent URL the browser is sent to.
pub fn authorization_url(config: &AuthConfig, csrf_state: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
        GOOGLE_AUTH_URL,
        urlencoding::encode(&config.google_client_id),
        urlencoding::encode(&config.auth_redirect_uri),
        urlencoding::encode(&LOGIN_SCOPES.join(" ")),
        urlencoding::encode(csrf_state),
    )
}

pub async fn exchange_code(
    http: &reqwest::Client,
    config: &AuthConfig,
    code: &str,
) -> anyhow::Result<TokenResponse> {
    let response = http
        .post(&config.token_url)
        .form(&CodeExchange {
            code,
            client_id: &config.google_client_id,
            client_secret: &config.google_client_secret,
            redirect_uri: &config.auth_redirect_uri,
            grant_type: "authorization_code",
        })
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("token exchange failed: {} - {}", status, body);
    }

    Ok(response.json().await?)
}

pub async fn fetch_user_info(
    http: &reqwest::Client,
    config: &AuthConfig,
    access_token: &str,
) -> anyhow::Result<UserInfo> {
    let info = http
        .get(&config.userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(info)
}

async fn refresh(
    http: &reqwest::Client,
    config: &AuthConfig,
    refresh_token: &str,
) -> anyhow::Result<TokenResponse> {
    let response = http
        .post(&config.token_url)
        .form(&RefreshGrant {
            refresh_token,
            client_id: &config.google_client_id,
            client_secret: &config.google_client_secret,
            grant_type: "refresh_token",
        })
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("token refresh failed: {} - {}", status, body);
    }

    Ok(response.json().await?)
}

fn is_fresh(tokens: &GoogleTokens, now: DateTime<Utc>) -> bool {
    match tokens.expires_at {
        Some(expires_at) => expires_at - now > Duration::seconds(EXPIRY_SKEW_SECS),
        None => true,
    }
}

/// Return a usable Google access token for `email`, refreshing it when
/// it is about to expire. No stored credentials means no session for the
/// calendar API.
pub async fn access_token_for(
    accounts: &dyn AccountRepository,
    http: &reqwest::Client,
    config: &AuthConfig,
    email: &str,
) -> ApiResult<String> {
    let tokens = accounts
        .get_tokens(email)
        .await?
        .ok_or_else(ApiError::unauthorized)?;

    let now = Utc::now();
    if is_fresh(&tokens, now) {
        return Ok(tokens.access_token);
    }

    let Some(refresh_token) = tokens.refresh_token.as_deref() else {
        tracing::warn!("Google access token for {} expired and no refresh token is stored", email);
        return Err(ApiError::unauthorized());
    };

    let refreshed = refresh(http, config, refresh_token).await.map_err(|e| {
        tracing::error!("Failed to refresh Google token for {}: {:?}", email, e);
        ApiError::unauthorized()
    })?;

    let tokens = refreshed.into_tokens(now);
    if tokens.refresh_token.is_some() {
        accounts.upsert_tokens(email, tokens.clone()).await?;
    } else if !accounts
        .update_access_token(email, &tokens.access_token, tokens.expires_at)
        .await?
    {
        return Err(ApiError::unauthorized());
    }
    tracing::info!("Refreshed Google access token for {}", email);

    Ok(tokens.access_token)
}
