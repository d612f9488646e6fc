//! Language model access: free-text replies and structured event
//! extraction.

use async_trait::async_trait;
use shared_types::{ChatMessage, EventSchedule, Role};
use thiserror::Error;

mod client;
mod types;

pub use client::OpenAiClient;

/// One message of a prompt sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for PromptMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("OPENAI_API_KEY is not configured")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Plain assistant reply to a conversation.
    async fn generate_text(&self, messages: &[PromptMessage]) -> Result<String, LlmError>;

    /// Extract calendar events from a conversation into the fixed event schema.
    async fn generate_schedule(&self, messages: &[PromptMessage])
        -> Result<EventSchedule, LlmError>;
}
