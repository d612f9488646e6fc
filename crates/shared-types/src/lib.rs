use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod event;
#[cfg(feature = "diesel")]
mod json_wrapper;

pub use event::{
    validate_recurrence_line, Attendee, CalendarEvent, EventDateTime, EventSchedule,
    EventValidationError, ReminderOverride, Reminders,
};
#[cfg(feature = "diesel")]
pub use json_wrapper::JsonWrapper;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A persisted chat document, owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub calendar_events: Vec<CalendarEvent>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sidebar listing entry: a chat without its transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Chat> for ChatSummary {
    fn from(chat: &Chat) -> Self {
        ChatSummary {
            id: chat.id,
            title: chat.title.clone(),
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

// Chat API request types

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub title: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub calendar_events: Option<Vec<CalendarEvent>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChatRequest {
    pub title: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub calendar_events: Option<Vec<CalendarEvent>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameChatRequest {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppendMessageRequest {
    pub role: Option<Role>,
    pub content: Option<String>,
}

/// Body of the single-endpoint chat API: either a message for the
/// assistant, a new chat, or a transcript replacement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    pub message: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceMessagesRequest {
    pub chat_id: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantReply {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiRequest {
    pub chat_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    pub response: String,
    pub detected_event: Option<CalendarEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub chat_id: Option<String>,
}

/// An event the calendar provider accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    pub id: Option<String>,
    pub html_link: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub status: u16,
    pub created: Vec<CreatedEvent>,
}

// Generic responses

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEnvelope {
    pub success: bool,
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatList {
    pub chats: Vec<Chat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbHealthResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// Debug listing

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePreview {
    pub role: Role,
    #[serde(rename = "contentPreview")]
    pub content_preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugChat {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessagePreview>,
}

impl From<&Chat> for DebugChat {
    fn from(chat: &Chat) -> Self {
        DebugChat {
            id: chat.id,
            user_id: chat.user_id.clone(),
            title: chat.title.clone(),
            message_count: chat.messages.len(),
            created_at: chat.created_at,
            messages: chat
                .messages
                .iter()
                .map(|m| MessagePreview {
                    role: m.role,
                    content_preview: message_preview(&m.content),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugChatsResponse {
    pub total_chats: usize,
    pub chats: Vec<DebugChat>,
}

const PREVIEW_CHARS: usize = 50;

/// Shorten message content for listings, marking truncation with `...`.
pub fn message_preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

// Auth API types

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInitResponse {
    pub auth_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUserResponse {
    pub email: String,
    pub name: Option<String>,
}

// Blog

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentBlockKind {
    Paragraph,
    SectionHeader,
    Code,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: ContentBlockKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogAuthor {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub slug: String,
    pub author: BlogAuthor,
    pub read_time: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentBlock>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_timestamp_defaults_when_absent() {
        let before = Utc::now();
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"hi"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.timestamp >= before);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result: Result<ChatMessage, _> =
            serde_json::from_str(r#"{"role":"tool","content":"hi"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn chat_serializes_camel_case() {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            user_id: "a@example.com".to_string(),
            title: DEFAULT_CHAT_TITLE.to_string(),
            messages: vec![],
            calendar_events: vec![],
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&chat).unwrap();
        assert_eq!(json["userId"], "a@example.com");
        assert!(json["calendarEvents"].is_array());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn preview_truncates_long_content() {
        assert_eq!(message_preview("short"), "short");
        let exact = "x".repeat(50);
        assert_eq!(message_preview(&exact), exact);
        let long = "y".repeat(51);
        assert_eq!(message_preview(&long), format!("{}...", "y".repeat(50)));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let accented = "é".repeat(60);
        let preview = message_preview(&accented);
        assert_eq!(preview.chars().count(), 53);
    }

    #[test]
    fn content_block_kind_uses_kebab_case() {
        let block: ContentBlock =
            serde_json::from_str(r#"{"type":"section-header","content":"Setup","id":"setup"}"#)
                .unwrap();
        assert_eq!(block.kind, ContentBlockKind::SectionHeader);
        assert_eq!(block.id.as_deref(), Some("setup"));
    }
}
