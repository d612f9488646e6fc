use axum::{extract::State, Extension, Json};
use shared_types::{ScheduleRequest, ScheduleResponse};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::SchedulingService;
use crate::AppState;

use super::JsonBody;

/// Turn a conversation into events on the user's Google Calendar.
pub async fn create_events(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    JsonBody(payload): JsonBody<ScheduleRequest>,
) -> ApiResult<Json<ScheduleResponse>> {
    let response = SchedulingService::schedule(
        &state,
        user.user_id(),
        &payload.messages,
        payload.chat_id.as_deref(),
    )
    .await?;
    Ok(Json(response))
}
