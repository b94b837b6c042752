//! Timestamp parsing and local-time conversion.
//!
//! Terminal exports are not consistent about time: some write unix seconds,
//! some RFC-3339 with an offset, and many write naive wall-clock times in the
//! broker's server zone. Everything is converted to UTC at the edge; the rest
//! of the crate never sees local time.
//!
//! - New York "fall back" ambiguity (2024-11-03 01:30 occurs twice):
//!   PreferEarliest -> 05:30Z, PreferLatest -> 06:30Z.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format used for naive timestamps in CSV files and metadata.
pub const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TzError {
    #[error("unknown time zone: {0}")]
    UnknownZone(String),

    #[error("unparseable timestamp: {0}")]
    BadTimestamp(String),

    #[error("ambiguous local time {0}")]
    Ambiguous(NaiveDateTime),

    #[error("nonexistent local time {0}")]
    Nonexistent(NaiveDateTime),
}

/// Policy for handling DST edge cases when converting local naive timestamps to UTC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Error on ambiguous (fall-back) or nonexistent (spring-forward) local times.
    #[default]
    Strict,
    /// For ambiguous local times, pick the earlier instant.
    PreferEarliest,
    /// For ambiguous local times, pick the later instant.
    PreferLatest,
    /// For nonexistent local times, step forward a minute at a time until a
    /// valid instant is found (capped at 2 hours).
    ShiftForward,
}

/// Parse an IANA zone name such as `"Europe/Athens"`.
pub fn parse_zone(name: &str) -> Result<Tz, TzError> {
    name.trim()
        .parse()
        .map_err(|_| TzError::UnknownZone(name.to_string()))
}

/// Convert a naive local timestamp in `tz` to UTC according to `policy`.
pub fn from_local_naive(
    naive: NaiveDateTime,
    tz: Tz,
    policy: DstPolicy,
) -> Result<DateTime<Utc>, TzError> {
    use chrono::offset::LocalResult::*;
    match tz.from_local_datetime(&naive) {
        Single(dt) => Ok(dt.with_timezone(&Utc)),
        Ambiguous(a, b) => match policy {
            DstPolicy::PreferEarliest => Ok(a.with_timezone(&Utc)),
            DstPolicy::PreferLatest => Ok(b.with_timezone(&Utc)),
            _ => Err(TzError::Ambiguous(naive)),
        },
        None => match policy {
            DstPolicy::ShiftForward => {
                let mut t = naive;
                for _ in 0..120 {
                    t += TimeDelta::minutes(1);
                    if let Single(dt) = tz.from_local_datetime(&t) {
                        return Ok(dt.with_timezone(&Utc));
                    }
                }
                Err(TzError::Nonexistent(naive))
            }
            _ => Err(TzError::Nonexistent(naive)),
        },
    }
}

/// Parse a `datetime` cell: RFC-3339 with an explicit offset is taken as is;
/// otherwise the value must be `YYYY-mm-dd HH:MM:SS` (a `T` separator is also
/// accepted) and is read as wall-clock time in `tz`.
pub fn parse_datetime(s: &str, tz: Tz, policy: DstPolicy) -> Result<DateTime<Utc>, TzError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| TzError::BadTimestamp(s.to_string()))?;
    from_local_naive(naive, tz, policy)
}

/// Parse a `time` cell holding unix seconds.
pub fn parse_unix_seconds(s: &str) -> Result<DateTime<Utc>, TzError> {
    s.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| TzError::BadTimestamp(s.to_string()))
}

/// Format a UTC instant as `YYYY-mm-dd HH:MM:SS`.
pub fn format_naive(dt: DateTime<Utc>) -> String {
    dt.format(NAIVE_FORMAT).to_string()
}
