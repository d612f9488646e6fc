//! Calendar event objects in the shape accepted by the Google Calendar
//! event-insert endpoint, plus the checks applied before forwarding them.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime};
use chrono_tz::Tz;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    #[serde(default)]
    pub use_default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ReminderOverride>,
}

/// A single event as stored on a chat and sent to the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
}

/// The structured object the language model is asked to produce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSchedule {
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventValidationError {
    #[error("event summary is empty")]
    EmptySummary,

    #[error("invalid {field} time zone: {value}")]
    InvalidTimeZone { field: &'static str, value: String },

    #[error("invalid {field} date-time: {value}")]
    InvalidDateTime { field: &'static str, value: String },

    #[error("invalid recurrence rule: {0}")]
    InvalidRecurrence(String),
}

const RRULE_PARTS: &[&str] = &[
    "FREQ", "INTERVAL", "UNTIL", "COUNT", "BYSECOND", "BYMINUTE", "BYHOUR", "BYDAY",
    "BYMONTHDAY", "BYYEARDAY", "BYWEEKNO", "BYMONTH", "BYSETPOS", "WKST",
];

fn freq_regex() -> &'static Regex {
    static FREQ: OnceLock<Regex> = OnceLock::new();
    FREQ.get_or_init(|| {
        Regex::new(r"^(SECONDLY|MINUTELY|HOURLY|DAILY|WEEKLY|MONTHLY|YEARLY)$")
            .expect("static regex")
    })
}

fn part_value_regex() -> &'static Regex {
    static VALUE: OnceLock<Regex> = OnceLock::new();
    VALUE.get_or_init(|| {
        Regex::new(r"^(\d{8}(T\d{6}Z?)?|[+-]?\d*(MO|TU|WE|TH|FR|SA|SU)?)(,([+-]?\d*(MO|TU|WE|TH|FR|SA|SU)?))*$")
            .expect("static regex")
    })
}

impl CalendarEvent {
    /// Check the fields the calendar provider would otherwise reject.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.summary.trim().is_empty() {
            return Err(EventValidationError::EmptySummary);
        }
        validate_time(&self.start, "start")?;
        validate_time(&self.end, "end")?;
        for line in &self.recurrence {
            validate_recurrence_line(line)?;
        }
        Ok(())
    }
}

fn validate_time(value: &EventDateTime, field: &'static str) -> Result<(), EventValidationError> {
    if value.time_zone.parse::<Tz>().is_err() {
        return Err(EventValidationError::InvalidTimeZone {
            field,
            value: value.time_zone.clone(),
        });
    }

    let dt = value.date_time.as_str();
    let parses = DateTime::parse_from_rfc3339(dt).is_ok()
        || NaiveDateTime::parse_from_str(dt, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(dt, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(dt, "%Y-%m-%dT%H:%M").is_ok();

    if parses {
        Ok(())
    } else {
        Err(EventValidationError::InvalidDateTime {
            field,
            value: value.date_time.clone(),
        })
    }
}

/// Validate one line of an event's `recurrence` array.
///
/// Only RRULE bodies are inspected part by part; the date-list properties
/// just need a non-empty value.
pub fn validate_recurrence_line(line: &str) -> Result<(), EventValidationError> {
    let invalid = || EventValidationError::InvalidRecurrence(line.to_string());

    let (property, body) = line.split_once(':').ok_or_else(invalid)?;
    match property {
        "RRULE" | "EXRULE" => {}
        p if p.starts_with("RDATE") || p.starts_with("EXDATE") => {
            return if body.trim().is_empty() {
                Err(invalid())
            } else {
                Ok(())
            };
        }
        _ => return Err(invalid()),
    }

    let mut saw_freq = false;
    // Stray `;` separators leave empty parts; skip them.
    for part in body.split(';').filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once('=').ok_or_else(invalid)?;
        if !RRULE_PARTS.contains(&key) || value.is_empty() {
            return Err(invalid());
        }
        if key == "FREQ" {
            if !freq_regex().is_match(value) {
                return Err(invalid());
            }
            saw_freq = true;
        } else if !part_value_regex().is_match(value) {
            return Err(invalid());
        }
    }

    if saw_freq {
        Ok(())
    } else {
        Err(invalid())
    }
}
