//! HTTP client for the booking API
//!
//! Every call except the liveness ping is retried with exponential backoff
//! when the failure looks transient (transport error, 5xx, 429). Event
//! creation is not retried after a timeout, since the first attempt may
//! already have booked the event.

use std::time::Duration;

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use urlencoding::encode;

use crate::conversation::BookingDetails;
use crate::error::ClientError;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Backoff schedule: the n-th retry waits `2^n` seconds, clamped to the bounds
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after `attempt` failed attempts (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = Duration::from_secs(1u64 << attempt.min(32));
        exponential.max(self.min_delay).min(self.max_delay)
    }
}

// --- Response types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusySlot {
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Availability {
    pub busy_slots: Vec<BusySlot>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotSuggestion {
    pub start: String,
    pub end: String,
    pub duration_minutes: i64,
}

#[derive(Deserialize)]
struct SuggestResponse {
    suggestions: Vec<SlotSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreated {
    pub event_id: String,
    pub status: String,
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDetails {
    pub summary: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    pub status: String,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub status: String,
    pub event_id: String,
}

// --- Request types ---

#[derive(Debug, Serialize)]
struct CreateEventRequest<'a> {
    summary: &'a str,
    start_time: &'a str,
    end_time: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attendee_email: Option<&'a str>,
}

/// HTTP client for the booking API
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    #[cfg(test)]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the API answers `GET /` with 200 within the ping timeout
    pub async fn ping(&self) -> bool {
        match self
            .http
            .get(format!("{}/", self.base_url))
            .timeout(PING_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Backend ping failed");
                false
            }
        }
    }

    /// Busy slots between two RFC 3339 instants (first listing page)
    pub async fn availability(&self, start: &str, end: &str) -> Result<Availability, ClientError> {
        let url = format!(
            "{}/availability?start_time={}&end_time={}",
            self.base_url,
            encode(start),
            encode(end)
        );
        self.send_with_retry("availability", || self.http.get(&url))
            .await
    }

    pub async fn suggest_slots(
        &self,
        start: &str,
        end: &str,
        duration_minutes: i64,
    ) -> Result<Vec<SlotSuggestion>, ClientError> {
        let url = format!(
            "{}/suggest-slots?start_time={}&end_time={}&duration_minutes={}",
            self.base_url,
            encode(start),
            encode(end),
            duration_minutes
        );
        let resp: SuggestResponse = self
            .send_with_retry("suggest-slots", || self.http.get(&url))
            .await?;
        Ok(resp.suggestions)
    }

    pub async fn create_event(&self, booking: &BookingDetails) -> Result<EventCreated, ClientError> {
        let url = format!("{}/events", self.base_url);
        let body = CreateEventRequest {
            summary: &booking.summary,
            start_time: &booking.start_time,
            end_time: &booking.end_time,
            attendee_email: booking.attendee_email.as_deref(),
        };
        self.send_with_retry_if(
            "create event",
            |e| e.is_transient() && !e.is_timeout(),
            || self.http.post(&url).json(&body),
        )
        .await
    }

    pub async fn get_event(&self, id: &str) -> Result<EventDetails, ClientError> {
        let url = format!("{}/events/{}", self.base_url, encode(id));
        self.send_with_retry("get event", || self.http.get(&url))
            .await
    }

    pub async fn cancel_event(&self, id: &str) -> Result<CancelResponse, ClientError> {
        let url = format!("{}/events/{}", self.base_url, encode(id));
        self.send_with_retry("cancel event", || self.http.delete(&url))
            .await
    }

    // --- Internal helpers ---

    async fn send_with_retry<T, F>(&self, what: &str, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        self.send_with_retry_if(what, ClientError::is_transient, build)
            .await
    }

    async fn send_with_retry_if<T, R, F>(
        &self,
        what: &str,
        retryable: R,
        build: F,
    ) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        R: Fn(&ClientError) -> bool,
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 1;
        loop {
            match send(build()).await {
                Ok(value) => return Ok(value),
                Err(e) if retryable(&e) && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        call = what,
                        attempt,
                        error = %e,
                        "Backend call failed, retrying in {:?}",
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(call = what, attempt, error = %e, "Backend call failed");
                    return Err(e);
                }
            }
        }
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Deserialization(e.to_string()))
}
