//! Unified error handling for the backend API.
//!
//! Handlers return `ApiResult<T>` and use `?` freely; this module decides
//! the HTTP status and the `{ "error": ... }` body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared_types::{ErrorResponse, EventValidationError};
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::llm::LlmError;
use crate::store::StoreError;

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Storage backend failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Language model call failed
    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    /// Calendar provider rejected or failed a request
    #[error("{0}")]
    Calendar(#[from] CalendarError),

    /// Generic internal error
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body was not valid JSON for the expected shape
    #[error("Invalid JSON: {0}")]
    JsonParse(#[from] JsonRejection),

    /// Model produced an event the provider would reject
    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] EventValidationError),

    /// Environment or flag missing
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication required but not provided or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted to access resource
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    /// The error every ownership-filtered chat lookup reports on a miss.
    pub fn chat_not_found() -> Self {
        ApiError::NotFound("Chat".to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            ApiError::Store(StoreError::Pool(e)) => {
                tracing::error!("Connection pool error: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Database connection unavailable".to_string(),
                    None,
                )
            }
            ApiError::Store(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database operation failed".to_string(),
                    None,
                )
            }
            ApiError::Llm(LlmError::NotConfigured) => {
                tracing::error!("Language model requested but OPENAI_API_KEY is not set");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                    None,
                )
            }
            ApiError::Llm(e) => {
                tracing::error!("Language model error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process AI request".to_string(),
                    Some(e.to_string()),
                )
            }
            ApiError::Calendar(e) => {
                tracing::error!("Error creating calendar event: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.message(), None)
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(e.to_string()),
                )
            }
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                None,
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::JsonParse(e) => {
                tracing::warn!("JSON parse error: {:?}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "Invalid JSON format".to_string(),
                    Some(e.body_text()),
                )
            }
            ApiError::InvalidEvent(e) => {
                tracing::warn!("Rejected generated event: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    "Generated event is invalid".to_string(),
                    Some(e.to_string()),
                )
            }
            ApiError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                    None,
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        let cases = [
            (ApiError::chat_not_found(), StatusCode::NOT_FOUND),
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::unauthorized(), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (ApiError::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::Calendar(CalendarError::Api {
                    status: 403,
                    message: "Insufficient Permission".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::InvalidEvent(EventValidationError::EmptySummary),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn calendar_failure_surfaces_provider_message() {
        let err = ApiError::Calendar(CalendarError::Api {
            status: 400,
            message: "Bad Request: invalid start time".into(),
        });
        let response = err.into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.error, "Bad Request: invalid start time");
    }
}
