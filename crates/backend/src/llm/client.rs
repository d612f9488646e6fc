/// OpenAI-compatible Chat Completions client
use async_trait::async_trait;
use shared_types::EventSchedule;
use tracing::{debug, info};

use super::types::{
    event_schedule_format, ChatCompletionRequest, ChatCompletionResponse, ResponseFormat,
    WireMessage,
};
use super::{LanguageModel, LlmError, PromptMessage};

const DEFAULT_TEMPERATURE: f32 = 0.3;

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(
        http: reqwest::Client,
        api_key: Option<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Send one completion request and return the first choice's content.
    async fn complete(
        &self,
        messages: &[PromptMessage],
        response_format: Option<ResponseFormat>,
    ) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::NotConfigured)?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: DEFAULT_TEMPERATURE,
            response_format,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "Received model response");

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(match status.as_u16() {
                401 | 403 => LlmError::Authentication(format!("Invalid API key ({})", status)),
                429 => LlmError::RateLimit,
                code => LlmError::Api {
                    status: code,
                    message,
                },
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("Response contained no content".to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn generate_text(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
        self.complete(messages, None).await
    }

    async fn generate_schedule(
        &self,
        messages: &[PromptMessage],
    ) -> Result<EventSchedule, LlmError> {
        let content = self
            .complete(messages, Some(event_schedule_format()))
            .await?;

        let schedule: EventSchedule = serde_json::from_str(&content).map_err(|e| {
            LlmError::InvalidResponse(format!(
                "Failed to parse events: {}. Content: {}",
                e, content
            ))
        })?;

        info!(events = schedule.events.len(), "Extracted events from conversation");
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> OpenAiClient {
        OpenAiClient::new(
            reqwest::Client::new(),
            Some("test-api-key".to_string()),
            format!("{}/v1", server.uri()),
            "gpt-4o-mini",
        )
    }

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{ "message": { "content": content } }]
        }))
    }

    #[tokio::test]
    async fn generates_text_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hello" }
                ]
            })))
            .respond_with(reply("Hi! What would you like to schedule?"))
            .mount(&server)
            .await;

        let text = client(&server)
            .generate_text(&[PromptMessage::system("be brief"), PromptMessage::user("hello")])
            .await
            .unwrap();
        assert_eq!(text, "Hi! What would you like to schedule?");
    }

    #[tokio::test]
    async fn extracts_schedule_with_json_schema() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "response_format": { "type": "json_schema" }
            })))
            .respond_with(reply(
                r#"{"events":[{
                    "summary":"Gym","location":"","description":"Leg day",
                    "start":{"dateTime":"2025-03-03T07:00:00","timeZone":"America/New_York"},
                    "end":{"dateTime":"2025-03-03T08:00:00","timeZone":"America/New_York"},
                    "recurrence":["RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR"]
                }]}"#,
            ))
            .mount(&server)
            .await;

        let schedule = client(&server)
            .generate_schedule(&[PromptMessage::user("3-day-a-week gym schedule")])
            .await
            .unwrap();
        assert_eq!(schedule.events.len(), 1);
        assert_eq!(schedule.events[0].summary, "Gym");
        assert_eq!(schedule.events[0].recurrence.len(), 1);
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let result = client(&server).generate_text(&[PromptMessage::user("x")]).await;
        assert!(matches!(result, Err(LlmError::RateLimit)));
    }

    #[tokio::test]
    async fn authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let result = client(&server).generate_text(&[PromptMessage::user("x")]).await;
        assert!(matches!(result, Err(LlmError::Authentication(_))));
    }

    #[tokio::test]
    async fn unparsable_schedule_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(reply("not valid json"))
            .mount(&server)
            .await;

        let result = client(&server)
            .generate_schedule(&[PromptMessage::user("x")])
            .await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = OpenAiClient::new(
            reqwest::Client::new(),
            None,
            "http://127.0.0.1:9",
            "gpt-4o-mini",
        );
        let result = client.generate_text(&[PromptMessage::user("x")]).await;
        assert!(matches!(result, Err(LlmError::NotConfigured)));
    }
}
