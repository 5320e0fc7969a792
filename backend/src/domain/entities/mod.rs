//! Domain entities
//!
//! Core business objects representing calendar concepts.

pub mod event;
pub mod time;

pub use event::{
    Attendee, BusySlot, CalendarEvent, EventId, EventPage, EventRequest, EventStatus, EventTime,
    NewEvent, SendUpdates, SlotSuggestion,
};
pub use time::{parse_timestamp, TimeRange};
