/// OpenAI Chat Completions wire types
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchema>,
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonSchema {
    pub name: &'static str,
    pub schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: Message,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Message {
    pub content: Option<String>,
}

fn time_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "properties": {
            "dateTime": {
                "type": "string",
                "description": "RFC 3339 date-time, or local YYYY-MM-DDTHH:MM:SS"
            },
            "timeZone": {
                "type": "string",
                "description": "IANA time zone of the event time"
            }
        },
        "required": ["dateTime", "timeZone"],
        "additionalProperties": false
    })
}

/// Strict JSON schema for `EventSchedule`, in the Google event shape.
pub(crate) fn event_schedule_format() -> ResponseFormat {
    let event = json!({
        "type": "object",
        "properties": {
            "summary": { "type": "string", "description": "summary of the event" },
            "location": { "type": "string", "description": "location of the event" },
            "description": { "type": "string", "description": "description of the event" },
            "start": time_schema("starting time of the event"),
            "end": time_schema("ending time of event"),
            "recurrence": {
                "type": "array",
                "description": "RRULE strings for recurring events, e.g. RRULE:FREQ=WEEKLY;BYDAY=MO",
                "items": { "type": "string" }
            }
        },
        "required": ["summary", "location", "description", "start", "end", "recurrence"],
        "additionalProperties": false
    });

    ResponseFormat {
        format_type: "json_schema",
        json_schema: Some(JsonSchema {
            name: "calendar",
            schema: json!({
                "type": "object",
                "properties": {
                    "events": {
                        "type": "array",
                        "description": "list of all events in the calendar",
                        "items": event
                    }
                },
                "required": ["events"],
                "additionalProperties": false
            }),
            strict: Some(true),
        }),
    }
}
