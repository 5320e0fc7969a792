//! Error types for the chat front-end
//!
//! - `ClientError`: failures talking to the booking API
//! - `AppError`: handler errors rendered as JSON responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Booking API client errors
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Backend error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl ClientError {
    /// Transport failures, server errors and throttling are worth another attempt
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Request(_) => true,
            ClientError::Api { status, .. } => *status >= 500 || *status == 429,
            ClientError::Deserialization(_) => false,
        }
    }

    /// The request may have reached the backend before the client gave up
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Request(e) if e.is_timeout())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Backend error: {0}")]
    Backend(#[from] ClientError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Backend(e) => {
                tracing::error!("Backend error: {}", e);
                match e {
                    // Pass the backend's client errors through unchanged
                    ClientError::Api { status, message } if (400..500).contains(status) => (
                        StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                        "Backend rejected the request",
                        Some(message.clone()),
                    ),
                    ClientError::Api { .. } | ClientError::Deserialization(_) => {
                        (StatusCode::BAD_GATEWAY, "Backend error", None)
                    }
                    ClientError::Request(_) => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Backend unavailable",
                        None,
                    ),
                }
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
