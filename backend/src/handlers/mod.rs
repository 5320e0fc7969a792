//! HTTP handlers
//!
//! Axum request handlers for the API endpoints.

pub mod availability;
pub mod events;
pub mod health;

pub use availability::{check_availability, suggest_slots};
pub use events::{cancel_event, create_event, get_event};
pub use health::{health, root};
