//! Calendar event domain entity
//!
//! Events live in the calendar provider. The shapes here follow the
//! Google Calendar resource layout (`dateTime`/`date`/`timeZone`), which the
//! in-memory provider reuses so both adapters speak the same model.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::time::{parse_timestamp, TimeRange};
use crate::error::DomainError;

/// Provider-assigned event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl From<String> for EventId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Start or end of an event: a timed instant or an all-day date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn at(date_time: impl Into<String>, time_zone: impl Into<String>) -> Self {
        Self {
            date_time: Some(date_time.into()),
            date: None,
            time_zone: Some(time_zone.into()),
        }
    }

    #[cfg(test)]
    pub fn all_day(date: impl Into<String>) -> Self {
        Self {
            date_time: None,
            date: Some(date.into()),
            time_zone: None,
        }
    }

    /// The raw value, preferring `dateTime` over `date`
    pub fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }

    pub fn instant(&self) -> Result<DateTime<FixedOffset>, DomainError> {
        let raw = self
            .value()
            .ok_or_else(|| DomainError::Validation("event time has no value".to_string()))?;
        parse_timestamp(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            response_status: None,
        }
    }
}

/// Event status as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventStatus::Confirmed => write!(f, "confirmed"),
            EventStatus::Tentative => write!(f, "tentative"),
            EventStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "confirmed" => Ok(EventStatus::Confirmed),
            "tentative" => Ok(EventStatus::Tentative),
            "cancelled" | "canceled" => Ok(EventStatus::Cancelled),
            _ => Err(format!("Unknown event status: {}", s)),
        }
    }
}

/// Whether the provider should email attendees about a change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendUpdates {
    All,
    None,
}

impl SendUpdates {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendUpdates::All => "all",
            SendUpdates::None => "none",
        }
    }
}

/// An event as stored in the calendar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub status: EventStatus,
    pub attendees: Vec<Attendee>,
    pub html_link: Option<String>,
}

impl CalendarEvent {
    /// The busy interval this event occupies.
    ///
    /// All-day events parse to midnight UTC, so an event ending on date D
    /// frees the calendar at D 00:00.
    pub fn interval(&self) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>), DomainError> {
        Ok((self.start.instant()?, self.end.instant()?))
    }
}

/// A validated event ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub summary: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub attendees: Vec<Attendee>,
}

impl NewEvent {
    /// Attendees get an invitation only when there is someone to invite
    pub fn send_updates(&self) -> SendUpdates {
        if self.attendees.is_empty() {
            SendUpdates::None
        } else {
            SendUpdates::All
        }
    }
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// Request body for booking an event
#[derive(Debug, Clone, Deserialize)]
pub struct EventRequest {
    pub summary: String,
    pub start_time: String,
    pub end_time: String,
    /// One address, or several separated by commas
    #[serde(default)]
    pub attendee_email: Option<String>,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl TryFrom<EventRequest> for NewEvent {
    type Error = DomainError;

    fn try_from(req: EventRequest) -> Result<Self, Self::Error> {
        let summary = req.summary.trim();
        if summary.is_empty() {
            return Err(DomainError::Validation("summary cannot be empty".to_string()));
        }

        // Both times must parse and form a non-empty interval
        TimeRange::parse(&req.start_time, &req.end_time)?;

        let timezone = if req.timezone.trim().is_empty() {
            default_timezone()
        } else {
            req.timezone.trim().to_string()
        };

        let attendees = parse_attendees(req.attendee_email.as_deref())?;

        Ok(NewEvent {
            summary: summary.to_string(),
            description: req.description.filter(|d| !d.trim().is_empty()),
            location: req.location.filter(|l| !l.trim().is_empty()),
            start: EventTime::at(req.start_time.trim(), timezone.clone()),
            end: EventTime::at(req.end_time.trim(), timezone),
            attendees,
        })
    }
}

/// Split a comma-separated attendee list, rejecting anything that is not an address
fn parse_attendees(raw: Option<&str>) -> Result<Vec<Attendee>, DomainError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|email| {
            let valid = email
                .split_once('@')
                .map(|(local, domain)| !local.is_empty() && !domain.is_empty())
                .unwrap_or(false);
            if valid {
                Ok(Attendee::new(email))
            } else {
                Err(DomainError::Validation(format!(
                    "'{}' is not a valid email address",
                    email
                )))
            }
        })
        .collect()
}

/// A busy period reported by the availability check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusySlot {
    pub start: String,
    pub end: String,
    pub summary: String,
}

impl From<&CalendarEvent> for BusySlot {
    fn from(event: &CalendarEvent) -> Self {
        BusySlot {
            start: event.start.value().unwrap_or_default().to_string(),
            end: event.end.value().unwrap_or_default().to_string(),
            summary: event
                .summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "Busy".to_string()),
        }
    }
}

/// A free slot proposed for booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSuggestion {
    pub start: String,
    pub end: String,
    pub duration_minutes: i64,
}

/// One page of an event listing
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EventRequest {
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

    #[test]
    fn valid_request_becomes_new_event() {
        let event = NewEvent::try_from(request()).unwrap();
        assert_eq!(event.summary, "Team sync");
        assert_eq!(event.start.date_time.as_deref(), Some("2025-03-14T14:00:00Z"));
        assert_eq!(event.start.time_zone.as_deref(), Some("UTC"));
        assert_eq!(event.send_updates(), SendUpdates::None);
    }

    #[test]
    fn blank_summary_is_rejected() {
        let mut req = request();
        req.summary = "   ".to_string();
        assert!(NewEvent::try_from(req).is_err());
    }

    #[test]
    fn non_iso_time_is_rejected() {
        let mut req = request();
        req.start_time = "tomorrow at 2".to_string();
        assert!(NewEvent::try_from(req).is_err());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut req = request();
        req.end_time = "2025-03-14T13:00:00Z".to_string();
        assert!(NewEvent::try_from(req).is_err());
    }

    #[test]
    fn attendees_are_split_and_trigger_updates() {
        let mut req = request();
        req.attendee_email = Some("ana@example.com, bo@example.com".to_string());
        let event = NewEvent::try_from(req).unwrap();
        assert_eq!(
            event.attendees,
            vec![Attendee::new("ana@example.com"), Attendee::new("bo@example.com")]
        );
        assert_eq!(event.send_updates(), SendUpdates::All);
    }

    #[test]
    fn empty_attendee_string_means_no_attendees() {
        let mut req = request();
        req.attendee_email = Some("".to_string());
        let event = NewEvent::try_from(req).unwrap();
        assert!(event.attendees.is_empty());
    }

    #[test]
    fn malformed_attendee_is_rejected() {
        let mut req = request();
        req.attendee_email = Some("not-an-email".to_string());
        assert!(NewEvent::try_from(req).is_err());
    }

    #[test]
    fn busy_slot_defaults_summary() {
        let event = CalendarEvent {
            id: EventId("e1".to_string()),
            summary: None,
            description: None,
            location: None,
            start: EventTime::all_day("2025-03-14"),
            end: EventTime::all_day("2025-03-15"),
            status: EventStatus::Confirmed,
            attendees: vec![],
            html_link: None,
        };
        let slot = BusySlot::from(&event);
        assert_eq!(slot.summary, "Busy");
        assert_eq!(slot.start, "2025-03-14");
    }

    #[test]
    fn event_time_serializes_camel_case() {
        let json = serde_json::to_value(EventTime::at("2025-03-14T14:00:00Z", "UTC")).unwrap();
        assert_eq!(json["dateTime"], "2025-03-14T14:00:00Z");
        assert_eq!(json["timeZone"], "UTC");
        assert!(json.get("date").is_none());
    }
}
