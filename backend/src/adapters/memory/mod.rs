//! In-memory adapter
//!
//! Process-local calendar used when no external provider is configured.

mod calendar;

pub use calendar::InMemoryCalendar;
