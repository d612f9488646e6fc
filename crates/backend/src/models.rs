// Database models for Diesel
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use shared_types::{CalendarEvent, Chat, ChatMessage, ChatSummary, JsonWrapper};
use uuid::Uuid;

use crate::store::GoogleTokens;

/// Database representation of a chat document.
/// Transcript and events are JSON stored as TEXT.
#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = crate::schema::chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatRow {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub messages: JsonWrapper<Vec<ChatMessage>>,
    pub calendar_events: JsonWrapper<Vec<CalendarEvent>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatRow> for Chat {
    fn from(row: ChatRow) -> Self {
        Chat {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            messages: row.messages.into_inner(),
            calendar_events: row.calendar_events.into_inner(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Listing projection that skips the JSON columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::chats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatSummaryRow {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatSummaryRow> for ChatSummary {
    fn from(row: ChatSummaryRow) -> Self {
        ChatSummary {
            id: row.id,
            title: row.title,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::chats)]
pub struct NewChatRow<'a> {
    pub user_id: &'a str,
    pub title: String,
    pub messages: JsonWrapper<Vec<ChatMessage>>,
    pub calendar_events: JsonWrapper<Vec<CalendarEvent>>,
}

/// Partial update; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = crate::schema::chats)]
pub struct ChatChangeset {
    pub title: Option<String>,
    pub messages: Option<JsonWrapper<Vec<ChatMessage>>>,
    pub calendar_events: Option<JsonWrapper<Vec<CalendarEvent>>>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::google_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GoogleAccountRow {
    pub email: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<GoogleAccountRow> for GoogleTokens {
    fn from(row: GoogleAccountRow) -> Self {
        GoogleTokens {
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
        }
    }
}
