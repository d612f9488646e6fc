//! Conversation-to-calendar pipeline.

use chrono::Utc;
use shared_types::{CalendarEvent, ChatMessage, CreatedEvent, ScheduleResponse};
use uuid::Uuid;

use crate::auth::google;
use crate::error::ApiResult;
use crate::llm::PromptMessage;
use crate::prompts;
use crate::AppState;

use super::tidy_event;

pub struct SchedulingService;

impl SchedulingService {
    /// Extract events from `messages`, insert them into the user's primary
    /// calendar in order and, when `chat_id` names one of the user's chats,
    /// record them there.
    ///
    /// Insertion stops at the first provider failure; events inserted
    /// before it stay in the calendar.
    pub async fn schedule(
        state: &AppState,
        user_id: &str,
        messages: &[ChatMessage],
        chat_id: Option<&str>,
    ) -> ApiResult<ScheduleResponse> {
        let now = Utc::now();
        let mut prompt = Vec::with_capacity(messages.len() + 2);
        prompt.push(PromptMessage::system(prompts::scheduler_system_prompt()));
        prompt.push(PromptMessage::system(prompts::extraction_instruction(
            now,
            state.assistant_timezone,
        )));
        prompt.extend(messages.iter().map(PromptMessage::from));

        let schedule = state.llm.generate_schedule(&prompt).await?;
        let events: Vec<CalendarEvent> = schedule.events.into_iter().map(tidy_event).collect();
        for event in &events {
            event.validate()?;
        }

        let access_token = google::access_token_for(
            state.accounts.as_ref(),
            &state.http,
            &state.auth_config,
            user_id,
        )
        .await?;

        let mut created: Vec<CreatedEvent> = Vec::with_capacity(events.len());
        for event in &events {
            match state.calendar.insert_event(&access_token, event).await {
                Ok(c) => {
                    tracing::info!("Created calendar event '{}' for {}", c.summary, user_id);
                    created.push(c);
                }
                Err(e) => {
                    let done: Vec<&str> = created.iter().map(|c| c.summary.as_str()).collect();
                    tracing::error!(
                        "Calendar insert failed at '{}' after {} event(s) {:?}: {}",
                        event.summary,
                        created.len(),
                        done,
                        e
                    );
                    return Err(e.into());
                }
            }
        }

        if let Some(raw) = chat_id {
            Self::record_on_chat(state, user_id, raw, events).await?;
        }

        Ok(ScheduleResponse {
            status: 201,
            created,
        })
    }

    async fn record_on_chat(
        state: &AppState,
        user_id: &str,
        raw_id: &str,
        events: Vec<CalendarEvent>,
    ) -> ApiResult<()> {
        let Ok(id) = Uuid::parse_str(raw_id) else {
            tracing::warn!("Ignoring malformed chat id {} on scheduling request", raw_id);
            return Ok(());
        };
        if state.chats.push_events(user_id, id, events).await?.is_none() {
            tracing::warn!("Chat {} not found for {}; events not recorded", id, user_id);
        }
        Ok(())
    }
}
