//! Google Calendar adapter
//!
//! Implements the calendar port against the Calendar v3 REST API.

mod client;

pub use client::GoogleCalendarClient;
