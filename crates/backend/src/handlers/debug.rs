use axum::{extract::State, Json};
use shared_types::{DebugChat, DebugChatsResponse};

use crate::error::ApiResult;
use crate::AppState;

const DEBUG_CHAT_LIMIT: i64 = 50;

/// Unscoped view of stored chats with shortened messages. Only routed
/// when debug routes are enabled.
pub async fn list_all_chats(State(state): State<AppState>) -> ApiResult<Json<DebugChatsResponse>> {
    let chats = state.chats.list_all(DEBUG_CHAT_LIMIT).await?;
    let chats: Vec<DebugChat> = chats.iter().map(DebugChat::from).collect();
    Ok(Json(DebugChatsResponse {
        total_chats: chats.len(),
        chats,
    }))
}
