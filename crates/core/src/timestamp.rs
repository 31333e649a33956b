//! Lenient date-time parsing for audit-log timestamp columns.
//!
//! Log sources disagree on timestamp layout, so parsing walks a fixed list
//! of formats and takes the first that fits. Offset-bearing values keep
//! their wall-clock time: `2025-06-14T02:00:00+05:00` has hour 2.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%d-%b-%Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%b %d %Y %H:%M:%S",
    "%b %d, %Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Parse a date-bearing value. Date-only values resolve to midnight.
///
/// Returns `None` for anything that does not carry a calendar date,
/// including bare times of day and plain numbers.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.naive_local());
    }
    // Trailing `Z` without the `T` separator, e.g. `2025-06-14 10:30:00Z`.
    if let Some(stripped) = value.strip_suffix('Z') {
        if let Some(ndt) = parse_naive(stripped) {
            return Some(ndt);
        }
    }
    if let Some(ndt) = parse_naive(value) {
        return Some(ndt);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Extract the hour of day (0-23) from a textual timestamp.
///
/// Accepts everything [`parse_datetime`] does plus bare times of day
/// (`02:15`, `23:59:59`).
pub fn parse_hour(value: &str) -> Option<u32> {
    if let Some(dt) = parse_datetime(value) {
        return Some(dt.hour());
    }
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        .map(|t| t.hour())
}
