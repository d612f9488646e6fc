//! Google Calendar event creation with a user's OAuth access token.

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::{CalendarEvent, CreatedEvent};
use thiserror::Error;

pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

const DEFAULT_FAILURE: &str = "Failed to create event";

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("calendar request failed: {0}")]
    Network(String),
}

impl CalendarError {
    /// Message shown to the user when an insert fails.
    pub fn message(&self) -> String {
        match self {
            CalendarError::Api { message, .. } => message.clone(),
            CalendarError::Network(e) => e.clone(),
        }
    }
}

#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Insert one event into the user's primary calendar.
    async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<CreatedEvent, CalendarError>;
}

pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/primary/events",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertedEvent {
    id: Option<String>,
    html_link: Option<String>,
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: Option<String>,
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_FAILURE.to_string())
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn insert_event(
        &self,
        access_token: &str,
        event: &CalendarEvent,
    ) -> Result<CreatedEvent, CalendarError> {
        tracing::debug!(summary = %event.summary, "Inserting calendar event");

        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(event)
            .send()
            .await
            .map_err(|e| CalendarError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let inserted: InsertedEvent = response
            .json()
            .await
            .map_err(|e| CalendarError::Network(format!("Invalid calendar response: {}", e)))?;

        Ok(CreatedEvent {
            id: inserted.id,
            html_link: inserted.html_link,
            summary: inserted.summary.unwrap_or_else(|| event.summary.clone()),
        })
    }
}
