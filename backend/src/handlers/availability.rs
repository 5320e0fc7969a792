//! Availability handlers
//!
//! Busy-period listing and free-slot suggestions over a time range.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::app::{Availability, SlotRequest};
use crate::domain::entities::SlotSuggestion;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_time: String,
    pub end_time: String,
    pub page_token: Option<String>,
}

/// GET /availability
///
/// Busy slots between `start_time` and `end_time`, one provider page at a time.
pub async fn check_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, AppError> {
    let availability = state
        .scheduling_service
        .availability(
            &query.start_time,
            &query.end_time,
            query.page_token.as_deref(),
        )
        .await?;

    Ok(Json(availability))
}

fn default_duration() -> i64 {
    30
}

fn default_increment() -> i64 {
    15
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    #[serde(default = "default_increment")]
    pub increment_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub suggestions: Vec<SlotSuggestion>,
}

/// GET /suggest-slots
pub async fn suggest_slots(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<Json<SuggestResponse>, AppError> {
    let request = SlotRequest::parse(
        &query.start_time,
        &query.end_time,
        query.duration_minutes,
        query.increment_minutes,
    )?;

    let suggestions = state.scheduling_service.suggest_slots(request).await?;
    Ok(Json(SuggestResponse { suggestions }))
}
