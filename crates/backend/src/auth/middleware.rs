//! Session middleware for protected routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::AppState;

use super::jwt;

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";
const OAUTH_STATE_MAX_AGE_SECS: i64 = 10 * 60;
use super::types::{AuthConfig, AuthUser, Claims};

/// Middleware that requires a valid session and exposes it to handlers as
/// an `Extension<AuthUser>`.
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.auth_config;

    let claims = match authenticate(request.headers(), config) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(AuthUser {
        email: claims.sub.clone(),
        name: claims.name.clone(),
    });

    let response = next.run(request).await;

    if jwt::should_refresh(&claims) {
        if let Ok(new_token) = jwt::create_token(config, &claims.sub, claims.name.clone()) {
            let cookie = build_auth_cookie(config, &new_token);
            let (mut parts, body) = response.into_parts();
            if let Ok(header_value) = cookie.parse() {
                parts.headers.insert(header::SET_COOKIE, header_value);
            }
            return Response::from_parts(parts, body);
        }
    }

    response
}

fn authenticate(headers: &HeaderMap, config: &AuthConfig) -> Result<Claims, ApiError> {
    let token = cookie_value(headers, &config.cookie_name)
        .or_else(|| extract_token_from_header(headers))
        .ok_or_else(ApiError::unauthorized)?;

    let claims = jwt::validate_token(config, &token).map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        ApiError::unauthorized()
    })?;

    if !config.is_email_allowed(&claims.sub) {
        return Err(ApiError::Forbidden("Email not authorized".to_string()));
    }

    Ok(claims)
}

/// Value of the named cookie in the request's `Cookie` header.
pub(crate) fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    cookie::Cookie::split_parse(cookie_header)
        .filter_map(Result::ok)
        .find(|c| c.name() == cookie_name)
        .map(|c| c.value().to_string())
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

/// Build the session cookie.
pub fn build_auth_cookie(config: &AuthConfig, value: &str) -> String {
    let max_age = config.token_duration_days * 24 * 60 * 60;
    let secure = if config.secure_cookies { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        config.cookie_name, value, max_age, secure
    )
}

/// Short-lived cookie carrying the OAuth `state` between login and callback.
pub fn build_state_cookie(config: &AuthConfig, state: &str) -> String {
    let secure = if config.secure_cookies { "; Secure" } else { "" };
    format!(
        "{}={}; Path=/api/auth; HttpOnly; SameSite=Lax; Max-Age={}{}",
        OAUTH_STATE_COOKIE, state, OAUTH_STATE_MAX_AGE_SECS, secure
    )
}

pub fn clear_state_cookie() -> String {
    format!(
        "{}=; Path=/api/auth; HttpOnly; SameSite=Lax; Max-Age=0",
        OAUTH_STATE_COOKIE
    )
}

/// Cookie that removes the session.
pub fn clear_auth_cookie(config: &AuthConfig) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.cookie_name
    )
}

/// Resolve the session user from raw headers, for routes outside the
/// `require_auth` layer.
pub fn extract_auth_user(headers: &HeaderMap, config: &AuthConfig) -> Result<AuthUser, ApiError> {
    let claims = authenticate(headers, config)?;
    Ok(AuthUser {
        email: claims.sub,
        name: claims.name,
    })
}
