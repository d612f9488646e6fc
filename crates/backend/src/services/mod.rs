//! Business logic behind the assistant and scheduling endpoints.
//!
//! Handlers parse and authenticate; these services talk to the language
//! model, the calendar provider and the chat store.

mod assistant;
mod scheduling;

pub use assistant::AssistantService;
pub use scheduling::SchedulingService;

use shared_types::CalendarEvent;

/// Strict-schema output always carries every field, so blank optional
/// strings mean "not given".
pub(crate) fn tidy_event(mut event: CalendarEvent) -> CalendarEvent {
    event.location = event.location.filter(|s| !s.trim().is_empty());
    event.description = event.description.filter(|s| !s.trim().is_empty());
    event
}
