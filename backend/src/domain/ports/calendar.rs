//! Calendar provider port trait
//!
//! Defines the interface the scheduling service needs from a calendar.

use async_trait::async_trait;

use crate::domain::entities::{CalendarEvent, EventId, EventPage, NewEvent, SendUpdates, TimeRange};
use crate::error::CalendarError;

/// Port trait for calendar operations
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Verify the configured calendar is reachable
    async fn check_calendar(&self) -> Result<(), CalendarError>;

    /// List single (expanded) events overlapping `range`, ordered by start time
    async fn list_events(
        &self,
        range: &TimeRange,
        page_token: Option<&str>,
    ) -> Result<EventPage, CalendarError>;

    /// Insert a new event
    async fn insert_event(
        &self,
        event: &NewEvent,
        send_updates: SendUpdates,
    ) -> Result<CalendarEvent, CalendarError>;

    /// Get an event by ID
    async fn get_event(&self, id: &EventId) -> Result<Option<CalendarEvent>, CalendarError>;

    /// Delete an event, failing with `EventNotFound` if it does not exist
    async fn delete_event(&self, id: &EventId, send_updates: SendUpdates)
        -> Result<(), CalendarError>;
}
