//! System prompts and the calendar keyword check.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

const TIME_FORMAT: &str = "%m/%d/%Y, %I:%M:%S %p";

const SCHEDULER_PROMPT: &str = "You are a scheduling assistant meant to create event schedules \
which can be exported to calendar apps such as Google Calendar. You need to make sure that all \
of the events can be scheduled and at every output you show the entire current schedule in full \
detail.";

/// Current time in `tz`, in the format the prompts use.
pub fn local_time(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

pub fn assistant_system_prompt(now: DateTime<Utc>, tz: Tz) -> String {
    format!(
        "You are a helpful assistant that helps users manage their tasks and calendar events. \
         If prompted with a message that appears to relate to an event, ask the user for the date, \
         and start and end times. If they provide a relative date/time the current time is {} ({}). \
         Once all relevant information is provided say \"Added to your Calendar\"",
        local_time(now, tz),
        tz.name()
    )
}

pub fn scheduler_system_prompt() -> &'static str {
    SCHEDULER_PROMPT
}

pub fn extraction_instruction(now: DateTime<Utc>, tz: Tz) -> String {
    format!(
        "Extract the information from this text and turn it into a calendar. \
         The current time is {} and event times should use the {} time zone unless the text says otherwise.",
        local_time(now, tz),
        tz.name()
    )
}

/// Whether a user message talks about scheduling or the calendar.
pub fn mentions_calendar(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.contains("schedule") || lower.contains("calendar")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 12, 5, 9).unwrap()
    }

    #[test]
    fn renders_time_in_configured_zone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        assert_eq!(local_time(fixed_now(), tz), "03/03/2025, 07:05:09 AM");
    }

    #[test]
    fn assistant_prompt_carries_time_and_completion_phrase() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let prompt = assistant_system_prompt(fixed_now(), tz);
        assert!(prompt.contains("03/03/2025, 07:05:09 AM"));
        assert!(prompt.contains("America/New_York"));
        assert!(prompt.contains("\"Added to your Calendar\""));
    }

    #[test]
    fn extraction_instruction_names_zone() {
        let tz: Tz = "Europe/Berlin".parse().unwrap();
        let text = extraction_instruction(fixed_now(), tz);
        assert!(text.starts_with("Extract the information from this text"));
        assert!(text.contains("03/03/2025, 01:05:09 PM"));
        assert!(text.contains("Europe/Berlin"));
    }

    #[test]
    fn keyword_detection_is_case_insensitive() {
        assert!(mentions_calendar("Can you SCHEDULE a call?"));
        assert!(mentions_calendar("put it on my Calendar"));
        assert!(mentions_calendar("my schedules are full"));
        assert!(!mentions_calendar("what's the weather like"));
    }

    #[test]
    fn scheduler_prompt_mentions_full_schedule() {
        assert!(scheduler_system_prompt().contains("entire current schedule"));
    }
}
