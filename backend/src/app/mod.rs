//! Application layer
//!
//! Contains use cases and service orchestration.
//! Services coordinate between domain entities, ports, and external systems.

pub mod scheduling_service;
pub mod slot_finder;

pub use scheduling_service::{Availability, SchedulingService, SlotRequest};
