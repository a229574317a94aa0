//! Helpers for turning play timestamps into calendar parts.
//!
//! These helpers define the one calendar convention used for both the `time`
//! dimension and the `year`/`month` columns of `songplays`:
//!
//! - Raw `ts` values are epoch milliseconds. They are truncated to whole
//!   seconds with floor division, so `start_time` has seconds precision.
//! - Parts are computed in a configurable IANA [`ReportingTimezone`]
//!   (default `America/New_York`).
//! - `week` is the ISO 8601 week number (1..=53, weeks start on Monday),
//!   while `year` stays the calendar year. 2018-12-31 is therefore week 1
//!   of year 2018.
//! - `weekday` counts from Sunday: 1 = Sunday ... 7 = Saturday.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Tz;
use snafu::prelude::*;

const MILLIS_PER_SECOND: i64 = 1_000;

/// Timezone used when no other is configured.
pub const DEFAULT_REPORTING_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Error returned when a timezone name is not a known IANA zone.
#[derive(Debug, Snafu)]
#[snafu(display("Unknown IANA timezone '{spec}': {reason}"))]
pub struct ParseTimezoneError {
    spec: String,
    reason: String,
}

/// IANA timezone in which play timestamps are decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingTimezone(Tz);

impl ReportingTimezone {
    /// Wrap an already-resolved zone.
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// IANA name, e.g. `America/New_York`.
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Underlying zone.
    pub fn tz(&self) -> Tz {
        self.0
    }
}

impl Default for ReportingTimezone {
    fn default() -> Self {
        Self(DEFAULT_REPORTING_TIMEZONE)
    }
}

impl FromStr for ReportingTimezone {
    type Err = ParseTimezoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();
        spec.parse::<Tz>().map(Self).map_err(|e| {
            ParseTimezoneSnafu {
                spec,
                reason: e.to_string(),
            }
            .build()
        })
    }
}

impl fmt::Display for ReportingTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Truncate epoch milliseconds to epoch seconds.
///
/// Floor division keeps the mapping monotonic for pre-epoch values too.
pub fn epoch_millis_to_secs(millis: i64) -> i64 {
    millis.div_euclid(MILLIS_PER_SECOND)
}

/// A play timestamp broken into the columns of the `time` dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarParts {
    /// Seconds since the Unix epoch (the `start_time` instant).
    pub start_time: i64,
    /// Hour of day, 0..=23.
    pub hour: u32,
    /// Day of month, 1..=31.
    pub day: u32,
    /// ISO 8601 week of year, 1..=53.
    pub week: u32,
    /// Month, 1..=12.
    pub month: u32,
    /// Calendar year.
    pub year: i32,
    /// Day of week, 1 = Sunday ... 7 = Saturday.
    pub weekday: u32,
}

/// Decompose epoch milliseconds into calendar parts in `tz`.
///
/// Returns `None` only for values outside chrono's representable range.
pub fn decompose_epoch_millis(millis: i64, tz: ReportingTimezone) -> Option<CalendarParts> {
    let secs = epoch_millis_to_secs(millis);
    let local = DateTime::<Utc>::from_timestamp(secs, 0)?.with_timezone(&tz.tz());

    Some(CalendarParts {
        start_time: secs,
        hour: local.hour(),
        day: local.day(),
        week: local.iso_week().week(),
        month: local.month(),
        year: local.year(),
        weekday: local.weekday().number_from_sunday(),
    })
}
