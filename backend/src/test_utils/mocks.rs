//! Mock implementations of port traits

use async_trait::async_trait;

use crate::domain::entities::{CalendarEvent, EventId, EventPage, NewEvent, SendUpdates, TimeRange};
use crate::domain::ports::CalendarProvider;
use crate::error::CalendarError;

/// A calendar whose every call fails as if the provider rejected our credentials
#[derive(Default)]
pub struct UnreachableCalendar;

#[async_trait]
impl CalendarProvider for UnreachableCalendar {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    async fn check_calendar(&self) -> Result<(), CalendarError> {
        Err(CalendarError::Unauthorized)
    }

    async fn list_events(
        &self,
        _range: &TimeRange,
        _page_token: Option<&str>,
    ) -> Result<EventPage, CalendarError> {
        Err(CalendarError::Unauthorized)
    }

    async fn insert_event(
        &self,
        _event: &NewEvent,
        _send_updates: SendUpdates,
    ) -> Result<CalendarEvent, CalendarError> {
        Err(CalendarError::Unauthorized)
    }

    async fn get_event(&self, _id: &EventId) -> Result<Option<CalendarEvent>, CalendarError> {
        Err(CalendarError::Unauthorized)
    }

    async fn delete_event(
        &self,
        _id: &EventId,
        _send_updates: SendUpdates,
    ) -> Result<(), CalendarError> {
        Err(CalendarError::Unauthorized)
    }
}
