//! Domain layer
//!
//! Contains pure business logic with no external dependencies.
//! - `entities`: Domain models representing calendar concepts
//! - `ports`: Trait definitions for external dependencies

pub mod entities;
pub mod ports;
