//! REST-style chat document endpoints, mounted at both `/api/chats` and
//! `/api/msghist`.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use shared_types::{
    AppendMessageRequest, Chat, ChatMessage, ChatSummary, CreateChatRequest, SuccessResponse,
    UpdateChatRequest,
};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::store::{ChatPatch, NewChat};
use crate::AppState;

use super::{parse_chat_id, JsonBody};

pub async fn list_chats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<ChatSummary>>> {
    let chats = state.chats.list_summaries(user.user_id()).await?;
    Ok(Json(chats))
}

pub async fn create_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<CreateChatRequest>,
) -> ApiResult<Json<Chat>> {
    let chat = state
        .chats
        .create(
            user.user_id(),
            NewChat {
                title: payload.title,
                messages: payload.messages.unwrap_or_default(),
                calendar_events: payload.calendar_events.unwrap_or_default(),
            },
        )
        .await?;

    tracing::info!("Created chat {} for {}", chat.id, user.email);
    Ok(Json(chat))
}

pub async fn get_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Chat>> {
    let id = parse_chat_id(&id)?;
    let chat = state
        .chats
        .get(user.user_id(), id)
        .await?
        .ok_or_else(ApiError::chat_not_found)?;
    Ok(Json(chat))
}

pub async fn update_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<UpdateChatRequest>,
) -> ApiResult<Json<Chat>> {
    let id = parse_chat_id(&id)?;
    let patch = ChatPatch {
        title: payload.title,
        messages: payload.messages,
        calendar_events: payload.calendar_events,
    };
    let chat = state
        .chats
        .update(user.user_id(), id, patch)
        .await?
        .ok_or_else(ApiError::chat_not_found)?;
    Ok(Json(chat))
}

pub async fn delete_chat(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<SuccessResponse>> {
    let id = parse_chat_id(&id)?;
    if !state.chats.delete(user.user_id(), id).await? {
        return Err(ApiError::chat_not_found());
    }
    tracing::info!("Deleted chat {} for {}", id, user.email);
    Ok(Json(SuccessResponse { success: true }))
}

pub async fn append_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    JsonBody(payload): JsonBody<AppendMessageRequest>,
) -> ApiResult<Json<ChatMessage>> {
    let (Some(role), Some(content)) = (payload.role, payload.content.filter(|c| !c.is_empty()))
    else {
        return Err(ApiError::bad_request("Role and content are required"));
    };

    let id = parse_chat_id(&id)?;
    let message = state
        .chats
        .append_message(user.user_id(), id, ChatMessage::new(role, content))
        .await?
        .ok_or_else(ApiError::chat_not_found)?;
    Ok(Json(message))
}
