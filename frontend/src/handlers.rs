//! HTTP handlers for the chat UI

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::ChatResponse;
use crate::client::{BusySlot, CancelResponse, EventDetails, SlotSuggestion};
use crate::error::AppError;
use crate::fields::MAX_DURATION_MINUTES;
use crate::AppState;

const EMBEDDED_INDEX: &str = include_str!("../static/index.html");

/// GET /
///
/// Serves `index.html` from the static directory, or the copy built into the binary.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let path = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(page) => Html(page),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Serving embedded page");
            Html(EMBEDDED_INDEX.to_string())
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
    pub backend_url: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let up = state.backend.ping().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        backend: if up { "up" } else { "down" }.to_string(),
        backend_url: state.backend.base_url().to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<Uuid>,
    pub message: String,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message cannot be empty".to_string()));
    }

    Ok(Json(
        state
            .chat
            .handle(request.session_id, &request.message)
            .await,
    ))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub days: Option<i64>,
    /// Days from now before the window opens; 7 is next week
    pub offset_days: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub busy_slots: Vec<BusySlot>,
    pub time_zone: Option<String>,
    pub backend_available: bool,
}

/// GET /schedule?days=7&offset_days=0
///
/// Busy slots in a window of `days` starting `offset_days` from now. An
/// unreachable backend yields an empty schedule.
pub async fn schedule(
    State(state): State<AppState>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let days = query.days.unwrap_or(7);
    if !(1..=31).contains(&days) {
        return Err(AppError::BadRequest("days must be between 1 and 31".to_string()));
    }
    let offset_days = query.offset_days.unwrap_or(0);
    if !(0..=31).contains(&offset_days) {
        return Err(AppError::BadRequest(
            "offset_days must be between 0 and 31".to_string(),
        ));
    }

    let empty = |backend_available| ScheduleResponse {
        busy_slots: Vec::new(),
        time_zone: None,
        backend_available,
    };

    if !state.backend.ping().await {
        return Ok(Json(empty(false)));
    }

    let from = Utc::now() + Duration::days(offset_days);
    let until = from + Duration::days(days);
    match state
        .backend
        .availability(&from.to_rfc3339(), &until.to_rfc3339())
        .await
    {
        Ok(availability) => Ok(Json(ScheduleResponse {
            busy_slots: availability.busy_slots,
            time_zone: availability.time_zone,
            backend_available: true,
        })),
        Err(e) => {
            tracing::error!(error = %e, "Error loading schedule");
            Ok(Json(empty(true)))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub suggestions: Vec<SlotSuggestion>,
}

/// GET /slots?date=YYYY-MM-DD&duration_minutes=60
pub async fn slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("'{}' is not a YYYY-MM-DD date", query.date)))?;
    let duration = query
        .duration_minutes
        .unwrap_or_else(|| state.chat.default_duration());
    if !(1..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(AppError::BadRequest(format!(
            "duration_minutes must be between 1 and {}",
            MAX_DURATION_MINUTES
        )));
    }

    let suggestions = state.chat.free_slots(date, duration).await?;
    Ok(Json(SlotsResponse { date, suggestions }))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventDetails>, AppError> {
    Ok(Json(state.backend.get_event(&id).await?))
}

/// DELETE /events/:id
pub async fn cancel_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CancelResponse>, AppError> {
    let cancelled = state.backend.cancel_event(&id).await?;
    tracing::info!(event_id = %cancelled.event_id, "Event cancelled");
    Ok(Json(cancelled))
}
