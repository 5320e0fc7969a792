//! Scheduling service
//!
//! Use cases behind the booking API: create, inspect and cancel events,
//! report busy periods and propose free slots.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset};
use serde::Serialize;

use super::slot_finder::find_free_slots;
use crate::domain::entities::{
    BusySlot, CalendarEvent, EventId, EventRequest, NewEvent, SendUpdates, SlotSuggestion,
    TimeRange,
};
use crate::domain::ports::CalendarProvider;
use crate::error::{AppError, DomainError};

/// Upper bound on listing pages fetched for one slot search
const MAX_LISTING_PAGES: usize = 20;

/// Longest slot length or step accepted by a slot search (one week)
pub const MAX_SLOT_MINUTES: i64 = 7 * 24 * 60;

type Interval = (DateTime<FixedOffset>, DateTime<FixedOffset>);

/// Busy periods in a range, one page at a time
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub busy_slots: Vec<BusySlot>,
    pub next_page_token: Option<String>,
    pub time_zone: String,
}

/// Parameters of a free-slot search
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest {
    pub range: TimeRange,
    pub duration: Duration,
    pub increment: Duration,
}

impl SlotRequest {
    pub fn parse(
        start_time: &str,
        end_time: &str,
        duration_minutes: i64,
        increment_minutes: i64,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            range: TimeRange::parse(start_time, end_time)?,
            duration: slot_minutes("duration_minutes", duration_minutes)?,
            increment: slot_minutes("increment_minutes", increment_minutes)?,
        })
    }
}

fn slot_minutes(name: &str, minutes: i64) -> Result<Duration, DomainError> {
    if !(1..=MAX_SLOT_MINUTES).contains(&minutes) {
        return Err(DomainError::Validation(format!(
            "{} must be between 1 and {}",
            name, MAX_SLOT_MINUTES
        )));
    }
    Duration::try_minutes(minutes)
        .ok_or_else(|| DomainError::Validation(format!("{} is out of range", name)))
}

/// Service for booking against a calendar provider
pub struct SchedulingService<C>
where
    C: CalendarProvider + ?Sized,
{
    calendar: Arc<C>,
}

impl<C> SchedulingService<C>
where
    C: CalendarProvider + ?Sized,
{
    pub fn new(calendar: Arc<C>) -> Self {
        Self { calendar }
    }

    pub fn provider_name(&self) -> &'static str {
        self.calendar.name()
    }

    /// Probe the calendar; failures mean the service cannot take bookings
    pub async fn health(&self) -> Result<(), AppError> {
        self.calendar.check_calendar().await.map_err(|e| {
            tracing::error!(provider = self.calendar.name(), error = %e, "Health check failed");
            AppError::Unavailable(e.to_string())
        })
    }

    /// Validate and book an event
    pub async fn create_event(&self, request: EventRequest) -> Result<CalendarEvent, AppError> {
        let event = NewEvent::try_from(request)?;
        let created = self
            .calendar
            .insert_event(&event, event.send_updates())
            .await?;

        tracing::info!(
            event_id = %created.id,
            attendees = created.attendees.len(),
            "Event scheduled"
        );
        Ok(created)
    }

    /// Busy periods for one listing page
    pub async fn availability(
        &self,
        start_time: &str,
        end_time: &str,
        page_token: Option<&str>,
    ) -> Result<Availability, AppError> {
        let range = TimeRange::parse(start_time, end_time)?;
        let page = self.calendar.list_events(&range, page_token).await?;

        Ok(Availability {
            busy_slots: page.items.iter().map(BusySlot::from).collect(),
            next_page_token: page.next_page_token,
            time_zone: page.time_zone.unwrap_or_else(|| "UTC".to_string()),
        })
    }

    /// Free slots of the requested length, avoiding every busy event in range
    pub async fn suggest_slots(&self, request: SlotRequest) -> Result<Vec<SlotSuggestion>, AppError> {
        let busy = self.busy_intervals(&request.range).await?;
        let minutes = request.duration.num_minutes();

        Ok(find_free_slots(&request, &busy)
            .into_iter()
            .map(|(start, end)| SlotSuggestion {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
                duration_minutes: minutes,
            })
            .collect())
    }

    pub async fn get_event(&self, id: &EventId) -> Result<CalendarEvent, AppError> {
        self.calendar
            .get_event(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Event {} not found", id)).into())
    }

    /// Delete an event and notify its attendees
    pub async fn cancel_event(&self, id: &EventId) -> Result<(), AppError> {
        self.calendar.delete_event(id, SendUpdates::All).await?;
        tracing::info!(event_id = %id, "Event cancelled");
        Ok(())
    }

    /// Collect busy intervals across all listing pages
    async fn busy_intervals(&self, range: &TimeRange) -> Result<Vec<Interval>, AppError> {
        let mut intervals = Vec::new();
        let mut page_token: Option<String> = None;

        for _ in 0..MAX_LISTING_PAGES {
            let page = self
                .calendar
                .list_events(range, page_token.as_deref())
                .await?;

            for event in &page.items {
                match event.interval() {
                    Ok(interval) => intervals.push(interval),
                    Err(e) => {
                        tracing::warn!(event_id = %event.id, error = %e, "Ignoring event with unreadable times")
                    }
                }
            }

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => return Ok(intervals),
            }
        }

        tracing::warn!(
            pages = MAX_LISTING_PAGES,
            "Stopped paging busy events; suggestions may include busy time"
        );
        Ok(intervals)
    }
}
