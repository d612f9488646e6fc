pub mod ai;
pub mod calendar;
pub mod chat;
pub mod chats;
pub mod debug;
pub mod health;

use axum::extract::FromRequest;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// `axum::Json` with rejections reported through [`ApiError`], so a
/// malformed body gets the usual `{ "error": ... }` 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Chat ids come straight from the URL or body; anything that is not a
/// UUID cannot name a stored chat.
pub(crate) fn parse_chat_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::chat_not_found())
}
