//! Unified error types for the calendar backend
//!
//! This module defines error types for each layer:
//! - `DomainError`: Booking rules and request validation errors
//! - `CalendarError`: Calendar provider errors (Google API or in-memory store)
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors - pure business logic errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),
}

/// Calendar provider errors
#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Calendar not found: {0}")]
    CalendarNotFound(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Unauthorized - invalid or expired access token")]
    Unauthorized,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Calendar error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Calendar(e) => {
                tracing::error!("Calendar error: {}", e);
                match e {
                    CalendarError::EventNotFound(id) => {
                        (StatusCode::NOT_FOUND, "Event not found", Some(id.clone()))
                    }
                    CalendarError::CalendarNotFound(_) | CalendarError::Unauthorized => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Calendar service unavailable",
                        None,
                    ),
                    CalendarError::RateLimited => {
                        (StatusCode::TOO_MANY_REQUESTS, "Rate limited", None)
                    }
                    CalendarError::Api { status, message } => {
                        // Client errors from the provider are the caller's fault
                        let http_status = if *status == 404 {
                            StatusCode::NOT_FOUND
                        } else if (400..500).contains(status) {
                            StatusCode::BAD_REQUEST
                        } else {
                            StatusCode::BAD_GATEWAY
                        };
                        (http_status, "Calendar service error", Some(message.clone()))
                    }
                    CalendarError::Request(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Calendar service unavailable",
                        None,
                    ),
                    CalendarError::Deserialization(_) => {
                        (StatusCode::BAD_GATEWAY, "Calendar service error", None)
                    }
                }
            }
            AppError::Unavailable(msg) => {
                tracing::error!("Service unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service unavailable",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
