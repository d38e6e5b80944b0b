//! Availability intervals.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A half-open time range `[start, end)`.
///
/// `end > start` is expected but not enforced here; the storage schema
/// rejects inverted ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Build an interval from unix timestamps in seconds, as stored.
    pub fn from_unix_seconds(start: i64, end: i64) -> Option<Self> {
        Some(Self {
            start: DateTime::from_timestamp(start, 0)?,
            end: DateTime::from_timestamp(end, 0)?,
        })
    }

    /// Start as whole unix seconds, as stored. Any sub-second part is
    /// dropped; parsed intervals never carry one.
    pub fn start_secs(&self) -> i64 {
        self.start.timestamp()
    }

    /// End as whole unix seconds. See [`Interval::start_secs`].
    pub fn end_secs(&self) -> i64 {
        self.end.timestamp()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Parses `START/END`, each side an RFC 3339 instant. Minute precision
/// UTC instants such as `2024-01-01T09:00Z` are accepted too. Fractional
/// seconds are rejected since storage keeps whole seconds.
impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('/')
            .ok_or_else(|| Error::Interval(format!("expected START/END, got {s:?}")))?;
        Ok(Self {
            start: parse_instant(start.trim())?,
            end: parse_instant(end.trim())?,
        })
    }
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, Error> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        if dt.nanosecond() != 0 {
            return Err(Error::Interval(format!(
                "sub-second precision is not supported: {s:?}"
            )));
        }
        return Ok(dt.with_timezone(&Utc));
    }
    s.strip_suffix('Z')
        .and_then(|naive| NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M").ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::Interval(format!("invalid instant {s:?}")))
}
