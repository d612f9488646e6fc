//! Assistant replies, standalone and inside a stored chat.

use chrono::Utc;
use shared_types::{AiResponse, CalendarEvent};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::llm::PromptMessage;
use crate::prompts;
use crate::AppState;

use super::tidy_event;

pub struct AssistantService;

impl AssistantService {
    /// One-shot reply to a single user message.
    pub async fn reply(state: &AppState, message: &str) -> ApiResult<String> {
        let prompt = [
            PromptMessage::system(prompts::assistant_system_prompt(
                Utc::now(),
                state.assistant_timezone,
            )),
            PromptMessage::user(message),
        ];
        Ok(state.llm.generate_text(&prompt).await?)
    }

    /// Reply within the context of one of the user's chats. Messages that
    /// talk about the calendar also get an event extracted and recorded on
    /// the chat.
    pub async fn respond_in_chat(
        state: &AppState,
        user_id: &str,
        chat_id: &str,
        message: &str,
    ) -> ApiResult<AiResponse> {
        let id = Uuid::parse_str(chat_id).map_err(|_| ApiError::chat_not_found())?;
        let chat = state
            .chats
            .get(user_id, id)
            .await?
            .ok_or_else(ApiError::chat_not_found)?;

        let now = Utc::now();
        let tz = state.assistant_timezone;

        let mut prompt = Vec::with_capacity(chat.messages.len() + 2);
        prompt.push(PromptMessage::system(prompts::assistant_system_prompt(now, tz)));
        prompt.extend(chat.messages.iter().map(PromptMessage::from));
        prompt.push(PromptMessage::user(message));

        let response = state.llm.generate_text(&prompt).await?;

        let detected_event = if prompts::mentions_calendar(message) {
            Self::detect_event(state, &prompt, now, tz).await?
        } else {
            None
        };

        if let Some(event) = &detected_event {
            state
                .chats
                .push_events(user_id, id, vec![event.clone()])
                .await?;
            tracing::info!("Recorded detected event '{}' on chat {}", event.summary, id);
        }

        Ok(AiResponse {
            response,
            detected_event,
        })
    }

    async fn detect_event(
        state: &AppState,
        conversation: &[PromptMessage],
        now: chrono::DateTime<Utc>,
        tz: chrono_tz::Tz,
    ) -> ApiResult<Option<CalendarEvent>> {
        let mut prompt = Vec::with_capacity(conversation.len() + 1);
        prompt.push(PromptMessage::system(prompts::extraction_instruction(now, tz)));
        prompt.extend(conversation.iter().skip(1).cloned());

        let schedule = state.llm.generate_schedule(&prompt).await?;
        let event = schedule
            .events
            .into_iter()
            .map(tidy_event)
            .find(|e| match e.validate() {
                Ok(()) => true,
                Err(err) => {
                    tracing::debug!("Skipping extracted event '{}': {}", e.summary, err);
                    false
                }
            });
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{ChatMessage, Role};

    use super::*;
    use crate::store::{ChatRepository, NewChat};
    use crate::testing::{event, state, FakeCalendar, FakeModel, USER};

    #[tokio::test]
    async fn reply_uses_assistant_prompt() {
        let model = Arc::new(FakeModel::new("When does it start?", vec![]));
        let (state, _) = state(model.clone(), Arc::new(FakeCalendar::default()));

        let reply = AssistantService::reply(&state, "book a haircut").await.unwrap();

        assert_eq!(reply, "When does it start?");
        let prompt = &model.calls()[0];
        assert_eq!(prompt.len(), 2);
        assert!(prompt[0].content.contains("Added to your Calendar"));
        assert_eq!(prompt[1], PromptMessage::user("book a haircut"));
    }

    #[tokio::test]
    async fn chat_reply_includes_history_without_detection() {
        let model = Arc::new(FakeModel::new("Sure.", vec![event("Unused", 4)]));
        let (state, store) = state(model.clone(), Arc::new(FakeCalendar::default()));
        let chat = store
            .create(
                USER,
                NewChat {
                    messages: vec![ChatMessage::new(Role::User, "hello")],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let response =
            AssistantService::respond_in_chat(&state, USER, &chat.id.to_string(), "thanks")
                .await
                .unwrap();

        assert_eq!(response.response, "Sure.");
        assert!(response.detected_event.is_none());
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 3);
    }

    #[tokio::test]
    async fn calendar_message_records_first_valid_event() {
        let mut invalid = event("Bad", 4);
        invalid.summary = "  ".to_string();
        let model = Arc::new(FakeModel::new(
            "Added to your Calendar",
            vec![invalid, event("Dentist", 5), event("Later", 6)],
        ));
        let (state, store) = state(model, Arc::new(FakeCalendar::default()));
        let chat = store.create(USER, NewChat::default()).await.unwrap();

        let response = AssistantService::respond_in_chat(
            &state,
            USER,
            &chat.id.to_string(),
            "Please SCHEDULE the dentist on Wednesday",
        )
        .await
        .unwrap();

        let detected = response.detected_event.unwrap();
        assert_eq!(detected.summary, "Dentist");
        let stored = store.get(USER, chat.id).await.unwrap().unwrap();
        assert_eq!(stored.calendar_events, vec![detected]);
    }

    #[tokio::test]
    async fn unknown_chat_is_not_found() {
        let model = Arc::new(FakeModel::new("x", vec![]));
        let (state, _) = state(model.clone(), Arc::new(FakeCalendar::default()));

        let missing = AssistantService::respond_in_chat(
            &state,
            USER,
            &Uuid::new_v4().to_string(),
            "hi",
        )
        .await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));

        let malformed = AssistantService::respond_in_chat(&state, USER, "not-a-uuid", "hi").await;
        assert!(matches!(malformed, Err(ApiError::NotFound(_))));
        assert!(model.calls().is_empty());
    }
}
