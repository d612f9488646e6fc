//! The single-path chat API used by the chat page: `/api/chat` with the
//! target chat in the body or the `chatId` query parameter.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use shared_types::{
    AssistantReply, AssistantRequest, ChatEnvelope, ChatList, RenameChatRequest,
    ReplaceMessagesRequest, SuccessResponse,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::AssistantService;
use crate::store::{ChatPatch, NewChat};
use crate::AppState;

use super::{parse_chat_id, JsonBody};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatIdQuery {
    pub chat_id: Option<String>,
}

fn required_chat_id(raw: Option<&str>) -> ApiResult<&str> {
    raw.filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Chat ID is required"))
}

pub async fn list_full_chats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<ChatList>> {
    let chats = state.chats.list_full(user.user_id()).await?;
    Ok(Json(ChatList { chats }))
}

/// Either answer `message` with the assistant or create a chat titled `title`.
pub async fn message_or_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<AssistantRequest>,
) -> ApiResult<Response> {
    if let Some(message) = payload.message.filter(|m| !m.is_empty()) {
        let reply = AssistantService::reply(&state, &message).await?;
        return Ok(Json(AssistantReply { message: reply }).into_response());
    }

    let chat = state
        .chats
        .create(
            user.user_id(),
            NewChat {
                title: payload.title,
                ..Default::default()
            },
        )
        .await?;
    Ok(Json(chat).into_response())
}

pub async fn replace_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<ReplaceMessagesRequest>,
) -> ApiResult<Json<ChatEnvelope>> {
    let id = parse_chat_id(required_chat_id(payload.chat_id.as_deref())?)?;
    let patch = ChatPatch {
        title: payload.title,
        messages: Some(payload.messages),
        calendar_events: None,
    };
    let chat = state
        .chats
        .update(user.user_id(), id, patch)
        .await?
        .ok_or_else(ApiError::chat_not_found)?;
    Ok(Json(ChatEnvelope {
        success: true,
        chat,
    }))
}

pub async fn rename_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ChatIdQuery>,
    JsonBody(payload): JsonBody<RenameChatRequest>,
) -> ApiResult<Json<ChatEnvelope>> {
    let id = parse_chat_id(required_chat_id(query.chat_id.as_deref())?)?;
    let patch = ChatPatch {
        title: payload.title,
        ..Default::default()
    };
    let chat = state
        .chats
        .update(user.user_id(), id, patch)
        .await?
        .ok_or_else(ApiError::chat_not_found)?;
    Ok(Json(ChatEnvelope {
        success: true,
        chat,
    }))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<ChatIdQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_chat_id(required_chat_id(query.chat_id.as_deref())?)?;
    if !state.chats.delete(user.user_id(), id).await? {
        return Err(ApiError::chat_not_found());
    }
    Ok(Json(SuccessResponse { success: true }))
}
