//! Liveness and health endpoints

use axum::{extract::State, Json};
use serde::Serialize;

use crate::error::AppError;
use crate::AppState;

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "API is live.",
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    provider: &'static str,
}

/// GET /health
///
/// Healthy only when the configured calendar answers.
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.scheduling_service.health().await?;

    Ok(Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.scheduling_service.provider_name(),
    }))
}
