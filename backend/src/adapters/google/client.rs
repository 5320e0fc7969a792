//! Google Calendar v3 API client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::domain::entities::{
    Attendee, CalendarEvent, EventId, EventPage, EventStatus, EventTime, NewEvent, SendUpdates,
    TimeRange,
};
use crate::domain::ports::CalendarProvider;
use crate::error::CalendarError;

/// Implementation of the calendar port backed by Google Calendar
pub struct GoogleCalendarClient {
    http: Client,
    base_url: String,
    calendar_id: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(base_url: String, calendar_id: String, access_token: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id,
            access_token,
        }
    }

    fn calendar_url(&self) -> String {
        format!("{}/calendars/{}", self.base_url, encode(&self.calendar_id))
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.calendar_url())
    }

    fn event_url(&self, id: &EventId) -> String {
        format!("{}/{}", self.events_url(), encode(&id.0))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::Deserialization(e.to_string()))
        } else {
            Err(self.error_from(response).await)
        }
    }

    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), CalendarError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.error_from(response).await)
        }
    }

    async fn error_from(&self, response: reqwest::Response) -> CalendarError {
        match response.status().as_u16() {
            401 => CalendarError::Unauthorized,
            429 => CalendarError::RateLimited,
            status => {
                let message = response.text().await.unwrap_or_default();
                CalendarError::Api { status, message }
            }
        }
    }
}

/// Request types for the Calendar API
#[derive(Serialize)]
struct InsertEventRequest<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    start: &'a EventTime,
    end: &'a EventTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendees: Option<&'a [Attendee]>,
}

/// Response types from the Calendar API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEventResponse {
    id: String,
    summary: Option<String>,
    description: Option<String>,
    location: Option<String>,
    #[serde(default)]
    start: EventTime,
    #[serde(default)]
    end: EventTime,
    status: Option<String>,
    #[serde(default)]
    attendees: Vec<Attendee>,
    html_link: Option<String>,
}

impl From<GoogleEventResponse> for CalendarEvent {
    fn from(r: GoogleEventResponse) -> Self {
        CalendarEvent {
            id: EventId(r.id),
            summary: r.summary,
            description: r.description,
            location: r.location,
            start: r.start,
            end: r.end,
            status: r
                .status
                .and_then(|s| s.parse().ok())
                .unwrap_or(EventStatus::Confirmed),
            attendees: r.attendees,
            html_link: r.html_link,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<GoogleEventResponse>,
    next_page_token: Option<String>,
    time_zone: Option<String>,
}

#[derive(Deserialize)]
struct CalendarResponse {
    id: String,
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn check_calendar(&self) -> Result<(), CalendarError> {
        let resp = self
            .http
            .get(self.calendar_url())
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Err(CalendarError::CalendarNotFound(self.calendar_id.clone()));
        }

        let calendar: CalendarResponse = self.handle_response(resp).await?;
        tracing::debug!(calendar_id = %calendar.id, "Calendar reachable");
        Ok(())
    }

    async fn list_events(
        &self,
        range: &TimeRange,
        page_token: Option<&str>,
    ) -> Result<EventPage, CalendarError> {
        let mut url = format!(
            "{}?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime",
            self.events_url(),
            encode(&range.start.to_rfc3339()),
            encode(&range.end.to_rfc3339()),
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", encode(token)));
        }

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let list: EventListResponse = self.handle_response(resp).await?;
        Ok(EventPage {
            items: list.items.into_iter().map(Into::into).collect(),
            next_page_token: list.next_page_token,
            time_zone: list.time_zone,
        })
    }

    async fn insert_event(
        &self,
        event: &NewEvent,
        send_updates: SendUpdates,
    ) -> Result<CalendarEvent, CalendarError> {
        let resp = self
            .http
            .post(format!(
                "{}?sendUpdates={}",
                self.events_url(),
                send_updates.as_str()
            ))
            .bearer_auth(&self.access_token)
            .json(&InsertEventRequest {
                summary: &event.summary,
                description: event.description.as_deref(),
                location: event.location.as_deref(),
                start: &event.start,
                end: &event.end,
                attendees: (!event.attendees.is_empty()).then_some(event.attendees.as_slice()),
            })
            .send()
            .await?;

        let created: GoogleEventResponse = self.handle_response(resp).await?;
        Ok(created.into())
    }

    async fn get_event(&self, id: &EventId) -> Result<Option<CalendarEvent>, CalendarError> {
        let resp = self
            .http
            .get(self.event_url(id))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            return Ok(None);
        }

        let event: GoogleEventResponse = self.handle_response(resp).await?;
        Ok(Some(event.into()))
    }

    async fn delete_event(
        &self,
        id: &EventId,
        send_updates: SendUpdates,
    ) -> Result<(), CalendarError> {
        let resp = self
            .http
            .delete(format!(
                "{}?sendUpdates={}",
                self.event_url(id),
                send_updates.as_str()
            ))
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        // 410 Gone: already deleted
        if matches!(resp.status().as_u16(), 404 | 410) {
            return Err(CalendarError::EventNotFound(id.to_string()));
        }

        self.handle_empty_response(resp).await
    }
}
