//! Chat-driven calendar scheduling backend.
//!
//! Users chat with an assistant, keep their chats as stored documents,
//! and turn conversations into Google Calendar events.

use std::sync::Arc;

use chrono_tz::Tz;

pub mod auth;
pub mod blog;
pub mod calendar;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod routes;
pub mod schema;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use routes::build_router;

use crate::auth::AuthConfig;
use crate::calendar::CalendarProvider;
use crate::llm::LanguageModel;
use crate::store::{AccountRepository, ChatRepository};

/// Shared handler state. Every backend is behind a trait object so tests
/// can swap in memory-backed or fake implementations.
#[derive(Clone)]
pub struct AppState {
    pub chats: Arc<dyn ChatRepository>,
    pub accounts: Arc<dyn AccountRepository>,
    pub llm: Arc<dyn LanguageModel>,
    pub calendar: Arc<dyn CalendarProvider>,
    pub auth_config: AuthConfig,
    /// Client for Google OAuth token and userinfo calls.
    pub http: reqwest::Client,
    pub assistant_timezone: Tz,
    pub enable_debug_routes: bool,
}
