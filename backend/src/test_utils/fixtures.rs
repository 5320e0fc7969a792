//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.

use crate::domain::entities::{CalendarEvent, EventId, EventRequest, EventStatus, EventTime};

/// Create a confirmed event with the given ID and times
pub fn test_event(id: &str, start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        id: EventId(id.to_string()),
        summary: Some(format!("Event {}", id)),
        description: None,
        location: None,
        start: EventTime::at(start, "UTC"),
        end: EventTime::at(end, "UTC"),
        status: EventStatus::Confirmed,
        attendees: vec![],
        html_link: None,
    }
}

/// Create a valid booking request with no attendees
pub fn test_event_request() -> EventRequest {
    EventRequest {
        summary: "Team sync".to_string(),
        start_time: "2025-03-14T14:00:00Z".to_string(),
        end_time: "2025-03-14T15:00:00Z".to_string(),
        attendee_email: None,
        timezone: "UTC".to_string(),
        description: None,
        location: None,
    }
}
