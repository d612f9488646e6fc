//! Authentication HTTP handlers.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

use super::{
    build_auth_cookie, clear_auth_cookie, extract_auth_user, google, jwt,
    middleware::{build_state_cookie, clear_state_cookie, cookie_value, OAUTH_STATE_COOKIE},
    types::{AuthUserResponse, LoginInitResponse},
};

/// Start Google OAuth login flow.
///
/// Returns a URL that the frontend should redirect the user to, and pins
/// the OAuth `state` in a cookie the callback checks.
pub async fn auth_login(State(state): State<AppState>) -> impl IntoResponse {
    let csrf_state = uuid::Uuid::new_v4().to_string();
    let auth_url = google::authorization_url(&state.auth_config, &csrf_state);
    let cookie = build_state_cookie(&state.auth_config, &csrf_state);

    (
        [(header::SET_COOKIE, cookie)],
        Json(LoginInitResponse { auth_url }),
    )
}

#[derive(Debug, Deserialize)]
pub struct AuthCallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
    pub state: Option<String>,
}

/// Handle Google OAuth callback.
///
/// Checks `state` against the login cookie, exchanges the code, checks the
/// allowlist, stores the Google tokens used for calendar access, and sets
/// the session cookie.
pub async fn auth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<AuthCallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!("Google returned an OAuth error: {}", error);
        return Redirect::to("/?auth_error=access_denied").into_response();
    }

    let expected = cookie_value(&headers, OAUTH_STATE_COOKIE);
    match (expected.as_deref(), params.state.as_deref()) {
        (Some(expected), Some(received)) if !expected.is_empty() && expected == received => {}
        _ => {
            tracing::warn!("OAuth callback state does not match the login cookie");
            return Redirect::to("/?auth_error=invalid_state").into_response();
        }
    }

    let Some(code) = params.code else {
        return Redirect::to("/?auth_error=missing_code").into_response();
    };

    match handle_callback_inner(&state, &code).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("Auth callback error: {:?}", e);
            Redirect::to("/?auth_error=auth_failed").into_response()
        }
    }
}

async fn handle_callback_inner(state: &AppState, code: &str) -> Result<Response, ApiError> {
    let config = &state.auth_config;

    let tokens = match google::exchange_code(&state.http, config, code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!("{:?}", e);
            return Ok(Redirect::to("/?auth_error=token_exchange_failed").into_response());
        }
    };

    let user_info = google::fetch_user_info(&state.http, config, &tokens.access_token).await?;

    tracing::info!("OAuth login attempt from: {}", user_info.email);

    if !config.is_email_allowed(&user_info.email) {
        tracing::warn!("Unauthorized login attempt from: {}", user_info.email);
        return Ok(Redirect::to("/?auth_error=unauthorized_email").into_response());
    }

    if tokens.refresh_token.is_none() {
        tracing::warn!("No refresh token received - calendar access ends when the access token expires");
    }
    state
        .accounts
        .upsert_tokens(&user_info.email, tokens.into_tokens(Utc::now()))
        .await?;

    let token = jwt::create_token(config, &user_info.email, user_info.name)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to create token: {}", e)))?;
    let cookie = build_auth_cookie(config, &token);

    tracing::info!("Successful login for: {}", user_info.email);

    Ok((
        StatusCode::SEE_OTHER,
        AppendHeaders([
            (header::LOCATION, "/chat".to_string()),
            (header::SET_COOKIE, cookie),
            (header::SET_COOKIE, clear_state_cookie()),
        ]),
    )
        .into_response())
}

/// Get current authenticated user info.
pub async fn auth_me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<AuthUserResponse>> {
    let user = extract_auth_user(&headers, &state.auth_config)?;
    Ok(Json(AuthUserResponse {
        email: user.email,
        name: user.name,
    }))
}

/// Logout - clear auth cookie.
pub async fn auth_logout(State(state): State<AppState>) -> impl IntoResponse {
    let cookie = clear_auth_cookie(&state.auth_config);

    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/".to_string()), (header::SET_COOKIE, cookie)],
    )
}
