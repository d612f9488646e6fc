use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared_types::DbHealthResponse;

use crate::AppState;

pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Connectivity probe for the chat store.
pub async fn db_health(State(state): State<AppState>) -> Response {
    match state.chats.ping().await {
        Ok(()) => Json(DbHealthResponse {
            success: true,
            message: "Successfully connected to the database".to_string(),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Failed to connect to the database: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "success": false,
                    "error": "Failed to connect to the database"
                })),
            )
                .into_response()
        }
    }
}
