//! Persistence of chat documents and per-user Google tokens.
//!
//! Every chat operation is scoped by the owning user: a chat that belongs
//! to someone else behaves exactly like one that does not exist.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{CalendarEvent, Chat, ChatMessage, ChatSummary, DEFAULT_CHAT_TITLE};
use thiserror::Error;
use uuid::Uuid;

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("failed to build connection pool: {0}")]
    Setup(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields for a chat about to be inserted.
#[derive(Debug, Clone, Default)]
pub struct NewChat {
    pub title: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub calendar_events: Vec<CalendarEvent>,
}

impl NewChat {
    /// Title to store: blank or missing titles fall back to the default.
    pub fn resolved_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => DEFAULT_CHAT_TITLE.to_string(),
        }
    }
}

/// Partial update of a chat. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ChatPatch {
    pub title: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub calendar_events: Option<Vec<CalendarEvent>>,
}

impl ChatPatch {
    pub fn rename(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Empty titles count as "not provided".
    pub fn effective_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn apply(self, chat: &mut Chat, now: DateTime<Utc>) {
        if let Some(title) = self.effective_title() {
            chat.title = title.to_string();
        }
        if let Some(messages) = self.messages {
            chat.messages = messages;
        }
        if let Some(events) = self.calendar_events {
            chat.calendar_events = events;
        }
        chat.updated_at = now;
    }
}

/// Stored Google OAuth credentials for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Titles and timestamps only, most recently updated first.
    async fn list_summaries(&self, user_id: &str) -> StoreResult<Vec<ChatSummary>>;

    /// Full documents, most recently updated first.
    async fn list_full(&self, user_id: &str) -> StoreResult<Vec<Chat>>;

    async fn create(&self, user_id: &str, chat: NewChat) -> StoreResult<Chat>;

    async fn get(&self, user_id: &str, id: Uuid) -> StoreResult<Option<Chat>>;

    async fn update(&self, user_id: &str, id: Uuid, patch: ChatPatch)
        -> StoreResult<Option<Chat>>;

    /// Append one message and bump `updated_at`. Returns `None` on a miss.
    async fn append_message(
        &self,
        user_id: &str,
        id: Uuid,
        message: ChatMessage,
    ) -> StoreResult<Option<ChatMessage>>;

    /// Append events to the chat's `calendarEvents`.
    async fn push_events(
        &self,
        user_id: &str,
        id: Uuid,
        events: Vec<CalendarEvent>,
    ) -> StoreResult<Option<Chat>>;

    /// Returns whether a chat was deleted.
    async fn delete(&self, user_id: &str, id: Uuid) -> StoreResult<bool>;

    /// Unscoped listing for the debug endpoint.
    async fn list_all(&self, limit: i64) -> StoreResult<Vec<Chat>>;

    async fn ping(&self) -> StoreResult<()>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert or replace tokens. A missing refresh token keeps the stored one,
    /// since Google only returns it on the first consent.
    async fn upsert_tokens(&self, email: &str, tokens: GoogleTokens) -> StoreResult<()>;

    async fn get_tokens(&self, email: &str) -> StoreResult<Option<GoogleTokens>>;

    /// Store a refreshed access token, leaving the refresh token alone.
    /// Returns false when no account exists for `email`.
    async fn update_access_token(
        &self,
        email: &str,
        access_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> StoreResult<bool>;
}
