//! Timestamp parsing helpers.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parses an expiry timestamp from its wire representation.
///
/// Subscribers send both timezone-aware (RFC 3339) and timezone-naive
/// timestamps; naive values are interpreted as UTC so that all comparisons
/// happen in a single zone.
pub fn parse_expire_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(aware) = DateTime::parse_from_rfc3339(value) {
        return Some(aware.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
