//! Parsers for booking form answers
//!
//! Each parser accepts one short free-text answer ("tomorrow", "2pm",
//! "30 mins", "ana@example.com, bo@example.com") and returns `None` when the
//! answer cannot be understood.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

/// Longest meeting the form accepts
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Find the first date mentioned in `text`, relative to `today`.
///
/// Understands `today`, `tomorrow`, weekday names (the next such day after
/// today) and ISO dates.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let re = Regex::new(r"\b(today|tomorrow|[a-z]{3,9}day|mon|tue|wed|thu|fri|sat|sun|\d{4}-\d{2}-\d{2})\b").ok()?;
    let text = text.to_lowercase();

    let found = re.captures_iter(&text).find_map(|caps| {
        let token = caps.get(1)?.as_str();
        match token {
            "today" => Some(today),
            "tomorrow" => today.succ_opt(),
            _ if token.contains('-') => NaiveDate::parse_from_str(token, "%Y-%m-%d").ok(),
            _ => Weekday::from_str(token).ok().map(|day| next_weekday(today, day)),
        }
    });
    found
}

/// The next `day` strictly after `today`
fn next_weekday(today: NaiveDate, day: Weekday) -> NaiveDate {
    let ahead = (day.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let ahead = if ahead == 0 { 7 } else { ahead };
    today + Duration::days(ahead)
}

/// Parse a clock time: `2pm`, `11:30 AM`, `14:00`, `at 9:15am`
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let re = Regex::new(r"^(?:at\s+)?(\d{1,2})(?::(\d{2}))?\s*(am|pm|a\.m\.|p\.m\.)?$").ok()?;
    let text = text.trim().to_lowercase();
    let caps = re.captures(&text)?;

    let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let meridiem = caps.get(3).map(|m| m.as_str().starts_with('p'));

    let hour = match meridiem {
        // A bare number is a duration or a date fragment, not a time
        None if caps.get(2).is_none() => return None,
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some(false) => hour % 12,
        Some(true) => hour % 12 + 12,
    };

    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse a meeting length in minutes: `1 hour`, `1.5 hours`, `30 mins`, `45`
pub fn parse_duration(text: &str) -> Option<i64> {
    let text = text.trim().to_lowercase();
    match text.as_str() {
        "an hour" | "one hour" => return Some(60),
        "half an hour" | "half hour" => return Some(30),
        _ => {}
    }

    let re = Regex::new(r"^(\d+(?:\.\d+)?)\s*(h|hr|hrs|hour|hours|m|min|mins|minute|minutes)?$").ok()?;
    let caps = re.captures(&text)?;
    let amount: f64 = caps.get(1)?.as_str().parse().ok()?;

    let minutes = match caps.get(2).map(|u| u.as_str()) {
        Some(unit) if unit.starts_with('h') => amount * 60.0,
        _ => amount,
    };
    let minutes = minutes.round() as i64;

    (1..=MAX_DURATION_MINUTES).contains(&minutes).then_some(minutes)
}

/// Parse an attendee answer.
///
/// `Some(None)` means no attendees; `Some(Some(list))` is a comma-separated
/// list of valid addresses; `None` means at least one entry is not an address.
pub fn parse_attendees(text: &str) -> Option<Option<String>> {
    let text = text.trim();
    if matches!(
        text.to_lowercase().as_str(),
        "" | "none" | "no" | "nobody" | "no one" | "skip" | "-"
    ) {
        return Some(None);
    }

    let email = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok()?;
    let addresses: Vec<&str> = text
        .split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if addresses.is_empty() || !addresses.iter().all(|a| email.is_match(a)) {
        return None;
    }
    Some(Some(addresses.join(",")))
}

/// Whether any word in `text` starts with one of `keywords`
pub fn mentions_any(text: &str, keywords: &[&str]) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| keywords.iter().any(|k| word.starts_with(k)))
}
