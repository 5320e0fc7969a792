//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod google;
pub mod memory;

pub use google::GoogleCalendarClient;
pub use memory::InMemoryCalendar;
