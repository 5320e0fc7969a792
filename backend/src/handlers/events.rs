//! Event handlers
//!
//! Endpoints for booking, inspecting and cancelling calendar events.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::domain::entities::{Attendee, EventId, EventRequest, EventStatus, EventTime};
use crate::error::AppError;
use crate::AppState;

/// Response body for a booked event
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub event_id: String,
    pub status: &'static str,
    pub html_link: Option<String>,
}

/// Response body for event details
#[derive(Debug, Serialize)]
pub struct EventDetails {
    pub summary: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    pub status: EventStatus,
    pub attendees: Vec<Attendee>,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub status: &'static str,
    pub event_id: String,
}

/// POST /events
///
/// Book a new event. Attendees are invited by the calendar provider.
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<EventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.scheduling_service.create_event(request).await?;

    Ok(Json(EventResponse {
        event_id: event.id.to_string(),
        status: "scheduled",
        html_link: event.html_link,
    }))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventDetails>, AppError> {
    let event = state.scheduling_service.get_event(&EventId(id)).await?;

    Ok(Json(EventDetails {
        summary: event.summary,
        start: event.start,
        end: event.end,
        status: event.status,
        attendees: event.attendees,
        html_link: event.html_link,
    }))
}

/// DELETE /events/:id
///
/// Cancel an event and notify its attendees.
pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, AppError> {
    let id = EventId(id);
    state.scheduling_service.cancel_event(&id).await?;

    Ok(Json(CancelResponse {
        status: "cancelled",
        event_id: id.to_string(),
    }))
}
