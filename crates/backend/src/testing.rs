//! In-process fakes for the language model and calendar provider.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use shared_types::{CalendarEvent, CreatedEvent, EventDateTime, EventSchedule};

use crate::calendar::{CalendarError, CalendarProvider};
use crate::llm::{LanguageModel, LlmError, PromptMessage};
use crate::store::{AccountRepository, GoogleTokens, MemoryStore};
use crate::AppState;

pub const USER: &str = "test@example.com";

pub fn event(summary: &str, day: u32) -> CalendarEvent {
    CalendarEvent {
        summary: summary.to_string(),
        location: None,
        description: None,
        start: EventDateTime {
            date_time: format!("2025-03-{:02}T09:00:00", day),
            time_zone: "America/New_York".to_string(),
        },
        end: EventDateTime {
            date_time: format!("2025-03-{:02}T10:00:00", day),
            time_zone: "America/New_York".to_string(),
        },
        recurrence: Vec::new(),
        attendees: None,
        reminders: None,
    }
}

/// Replies with a canned text and schedule, recording every prompt.
#[derive(Default)]
pub struct FakeModel {
    pub reply: String,
    pub schedule: EventSchedule,
    pub prompts: Mutex<Vec<Vec<PromptMessage>>>,
}

impl FakeModel {
    pub fn new(reply: &str, events: Vec<CalendarEvent>) -> Self {
        Self {
            reply: reply.to_string(),
            schedule: EventSchedule { events },
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<PromptMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate_text(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }

    async fn generate_schedule(
        &self,
        messages: &[PromptMessage],
    ) -> Result<EventSchedule, LlmError> {
        self.prompts.lock().unwrap().push(messages.to_vec());
        Ok(self.schedule.clone())
    }
}

/// Accepts events until `fail_on` is reached, recording the access tokens used.
#[derive(Default)]
pub struct FakeCalendar {
    pub fail_on: Option<String>,
    pub inserted: Mutex<Vec<(String, String)>>,
}

impl FakeCalendar {
    pub fn failing_on(summary: &str) -> Self {
        Self {
            fail_on: Some(summary.to_string()),
            inserted: Mutex::new(Vec::new()),
        }
    }

    pub fn inserted(&self) -> Vec<(String, String)> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarProvider for FakeCalendar {
    async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<CreatedEvent, CalendarError> {
        if self.fail_on.as_deref() == Some(event.summary.as_str()) {
            return Err(CalendarError::Api {
                status: 400,
                message: "Invalid start time".to_string(),
            });
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push((access_token.to_string(), event.summary.clone()));
        Ok(CreatedEvent {
            id: Some(format!("evt{}", inserted.len())),
            html_link: None,
            summary: event.summary.clone(),
        })
    }
}

pub fn state(model: Arc<FakeModel>, calendar: Arc<FakeCalendar>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState {
        chats: store.clone(),
        accounts: store.clone(),
        llm: model,
        calendar,
        auth_config: crate::auth::test_config(),
        http: reqwest::Client::new(),
        assistant_timezone: chrono_tz::America::New_York,
        enable_debug_routes: true,
    };
    (state, store)
}

pub async fn link_google_account(store: &MemoryStore, email: &str) {
    store
        .upsert_tokens(
            email,
            GoogleTokens {
                access_token: "google-access".to_string(),
                refresh_token: Some("google-refresh".to_string()),
                expires_at: Some(Utc::now() + Duration::hours(1)),
            },
        )
        .await
        .unwrap();
}
