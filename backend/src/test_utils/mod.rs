//! Test utilities
//!
//! Fixtures and failing port implementations for unit tests. The working
//! in-memory calendar lives in `adapters::memory` because it also runs in
//! local deployments.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
