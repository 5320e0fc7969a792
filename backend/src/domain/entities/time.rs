//! Timestamp parsing and time ranges
//!
//! Accepts the ISO 8601 forms clients actually send: RFC 3339 with an
//! offset or `Z`, a naive date-time (read as UTC), or a bare date
//! (midnight UTC).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::DomainError;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 timestamp, keeping its offset
pub fn parse_timestamp(input: &str) -> Result<DateTime<FixedOffset>, DomainError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt);
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc().fixed_offset());
    }

    Err(DomainError::Validation(format!(
        "'{}' is not an ISO 8601 time",
        input
    )))
}

/// A half-open interval `[start, end)` with `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl TimeRange {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Result<Self, DomainError> {
        if end <= start {
            return Err(DomainError::Validation(
                "end_time must be after start_time".to_string(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?)
    }

    /// Whether `[start, end)` shares any instant with this range
    pub fn overlaps(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        !(end <= self.start || start >= self.end)
    }
}
