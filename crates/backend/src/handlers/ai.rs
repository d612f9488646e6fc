use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Serialize;
use shared_types::AiRequest;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::AssistantService;
use crate::AppState;

use super::JsonBody;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReceivedFields {
    chat_id: bool,
    message: bool,
}

#[derive(Debug, Serialize)]
struct MissingFields {
    error: &'static str,
    received: ReceivedFields,
}

/// Assistant reply inside a stored chat, plus event detection.
pub async fn chat_ai(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<AiRequest>,
) -> ApiResult<Response> {
    let chat_id = payload.chat_id.filter(|s| !s.is_empty());
    let message = payload.message.filter(|s| !s.is_empty());

    let (Some(chat_id), Some(message)) = (chat_id.as_deref(), message.as_deref()) else {
        let body = MissingFields {
            error: "Chat ID and message are required",
            received: ReceivedFields {
                chat_id: chat_id.is_some(),
                message: message.is_some(),
            },
        };
        return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
    };

    tracing::debug!("AI request on chat {} for {}", chat_id, user.email);
    let response =
        AssistantService::respond_in_chat(&state, user.user_id(), chat_id, message).await?;
    Ok(Json(response).into_response())
}
