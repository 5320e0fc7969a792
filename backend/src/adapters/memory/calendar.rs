//! In-process calendar
//!
//! Keeps events in memory for local development and tests. Listing follows
//! the Google semantics the rest of the API relies on: cancelled events are
//! hidden, results are ordered by start time and paged with an opaque token.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::{
    CalendarEvent, EventId, EventPage, EventStatus, NewEvent, SendUpdates, TimeRange,
};
use crate::domain::ports::CalendarProvider;
use crate::error::CalendarError;

pub struct InMemoryCalendar {
    calendar_id: String,
    time_zone: String,
    page_size: usize,
    events: RwLock<BTreeMap<EventId, CalendarEvent>>,
}

impl InMemoryCalendar {
    pub fn new(calendar_id: impl Into<String>, page_size: usize) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            time_zone: "UTC".to_string(),
            page_size: page_size.max(1),
            events: RwLock::new(BTreeMap::new()),
        }
    }

    /// Pre-populate with an event
    #[cfg(test)]
    pub fn with_event(mut self, event: CalendarEvent) -> Self {
        self.events.get_mut().insert(event.id.clone(), event);
        self
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

fn parse_page_token(token: Option<&str>) -> Result<usize, CalendarError> {
    match token {
        None => Ok(0),
        Some(t) => t.parse().map_err(|_| CalendarError::Api {
            status: 400,
            message: format!("Invalid page token: {}", t),
        }),
    }
}

#[async_trait]
impl CalendarProvider for InMemoryCalendar {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn check_calendar(&self) -> Result<(), CalendarError> {
        Ok(())
    }

    async fn list_events(
        &self,
        range: &TimeRange,
        page_token: Option<&str>,
    ) -> Result<EventPage, CalendarError> {
        let offset = parse_page_token(page_token)?;
        let events = self.events.read().await;

        let mut matching: Vec<_> = events
            .values()
            .filter(|e| e.status != EventStatus::Cancelled)
            .filter_map(|e| match e.interval() {
                Ok((start, end)) if range.overlaps(start, end) => Some((start, e)),
                Ok(_) => None,
                Err(err) => {
                    tracing::warn!(event_id = %e.id, error = %err, "Skipping event with unreadable times");
                    None
                }
            })
            .collect();
        matching.sort_by(|(a_start, a), (b_start, b)| a_start.cmp(b_start).then(a.id.cmp(&b.id)));

        let items: Vec<CalendarEvent> = matching
            .iter()
            .skip(offset)
            .take(self.page_size)
            .map(|(_, e)| (*e).clone())
            .collect();

        let next = offset + items.len();
        let next_page_token = (next < matching.len()).then(|| next.to_string());

        Ok(EventPage {
            items,
            next_page_token,
            time_zone: Some(self.time_zone.clone()),
        })
    }

    async fn insert_event(
        &self,
        event: &NewEvent,
        send_updates: SendUpdates,
    ) -> Result<CalendarEvent, CalendarError> {
        let created = CalendarEvent {
            id: EventId(Uuid::new_v4().simple().to_string()),
            summary: Some(event.summary.clone()),
            description: event.description.clone(),
            location: event.location.clone(),
            start: event.start.clone(),
            end: event.end.clone(),
            status: EventStatus::Confirmed,
            attendees: event.attendees.clone(),
            html_link: None,
        };

        self.events
            .write()
            .await
            .insert(created.id.clone(), created.clone());

        tracing::debug!(
            calendar_id = %self.calendar_id,
            event_id = %created.id,
            attendees = created.attendees.len(),
            send_updates = send_updates.as_str(),
            "Stored event"
        );

        Ok(created)
    }

    async fn get_event(&self, id: &EventId) -> Result<Option<CalendarEvent>, CalendarError> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn delete_event(
        &self,
        id: &EventId,
        send_updates: SendUpdates,
    ) -> Result<(), CalendarError> {
        let removed = self.events.write().await.remove(id);
        match removed {
            Some(_) => {
                tracing::debug!(
                    calendar_id = %self.calendar_id,
                    event_id = %id,
                    send_updates = send_updates.as_str(),
                    "Deleted event"
                );
                Ok(())
            }
            None => Err(CalendarError::EventNotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EventTime;
    use crate::test_utils::test_event;

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::parse(start, end).unwrap()
    }

    #[tokio::test]
    async fn insert_then_get() {
        let calendar = InMemoryCalendar::new("primary", 10);
        let new_event = NewEvent {
            summary: "Standup".to_string(),
            description: None,
            location: None,
            start: EventTime::at("2025-03-14T09:00:00Z", "UTC"),
            end: EventTime::at("2025-03-14T09:15:00Z", "UTC"),
            attendees: vec![],
        };

        let created = calendar
            .insert_event(&new_event, SendUpdates::None)
            .await
            .unwrap();
        assert_eq!(created.status, EventStatus::Confirmed);

        let fetched = calendar.get_event(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.summary.as_deref(), Some("Standup"));
    }

    #[tokio::test]
    async fn list_filters_by_range_and_orders_by_start() {
        let calendar = InMemoryCalendar::new("primary", 10)
            .with_event(test_event("late", "2025-03-14T15:00:00Z", "2025-03-14T16:00:00Z"))
            .with_event(test_event("early", "2025-03-14T09:00:00Z", "2025-03-14T10:00:00Z"))
            .with_event(test_event("other-day", "2025-03-15T09:00:00Z", "2025-03-15T10:00:00Z"));

        let page = calendar
            .list_events(&range("2025-03-14T00:00:00Z", "2025-03-15T00:00:00Z"), None)
            .await
            .unwrap();

        let ids: Vec<_> = page.items.iter().map(|e| e.id.0.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);
        assert!(page.next_page_token.is_none());
        assert_eq!(page.time_zone.as_deref(), Some("UTC"));
    }

    #[tokio::test]
    async fn list_hides_cancelled_events() {
        let mut cancelled = test_event("gone", "2025-03-14T09:00:00Z", "2025-03-14T10:00:00Z");
        cancelled.status = EventStatus::Cancelled;
        let calendar = InMemoryCalendar::new("primary", 10).with_event(cancelled);

        let page = calendar
            .list_events(&range("2025-03-14T00:00:00Z", "2025-03-15T00:00:00Z"), None)
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn list_pages_through_results() {
        let calendar = InMemoryCalendar::new("primary", 2)
            .with_event(test_event("a", "2025-03-14T09:00:00Z", "2025-03-14T10:00:00Z"))
            .with_event(test_event("b", "2025-03-14T10:00:00Z", "2025-03-14T11:00:00Z"))
            .with_event(test_event("c", "2025-03-14T11:00:00Z", "2025-03-14T12:00:00Z"));
        let day = range("2025-03-14T00:00:00Z", "2025-03-15T00:00:00Z");

        let first = calendar.list_events(&day, None).await.unwrap();
        assert_eq!(first.items.len(), 2);
        let token = first.next_page_token.expect("expected a second page");

        let second = calendar.list_events(&day, Some(&token)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].id.0, "c");
        assert!(second.next_page_token.is_none());
    }

    #[tokio::test]
    async fn bad_page_token_is_rejected() {
        let calendar = InMemoryCalendar::new("primary", 2);
        let day = range("2025-03-14T00:00:00Z", "2025-03-15T00:00:00Z");
        assert!(matches!(
            calendar.list_events(&day, Some("abc")).await,
            Err(CalendarError::Api { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn delete_missing_event_fails() {
        let calendar = InMemoryCalendar::new("primary", 10)
            .with_event(test_event("a", "2025-03-14T09:00:00Z", "2025-03-14T10:00:00Z"));

        calendar
            .delete_event(&EventId("a".to_string()), SendUpdates::All)
            .await
            .unwrap();
        assert_eq!(calendar.len().await, 0);

        assert!(matches!(
            calendar
                .delete_event(&EventId("a".to_string()), SendUpdates::All)
                .await,
            Err(CalendarError::EventNotFound(_))
        ));
    }
}
