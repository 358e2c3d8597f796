//! Buckets backend timestamps into calendar months.

use chrono::{DateTime, Datelike, Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const MONTHS_IN_YEAR: usize = 12;

/// Short month names, indexed 0 (January) through 11 (December).
pub const MONTH_NAMES: [&str; MONTHS_IN_YEAR] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Timestamp layouts without an offset that the backend has been seen to send.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// A `(year, month index)` pair where the month index is 0 for January through 11 for December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthBucket {
    year: i32,
    month_index: usize,
}

impl MonthBucket {
    /// Returns `None` when `month_index` is not in `0..12`.
    pub fn new(year: i32, month_index: usize) -> Option<Self> {
        (month_index < MONTHS_IN_YEAR).then_some(Self { year, month_index })
    }

    /// Parses an ISO-8601 timestamp and buckets it in the machine's local timezone.
    pub fn parse(timestamp: &str) -> Option<Self> {
        Self::parse_in(timestamp, &Local)
    }

    /// Parses an ISO-8601 timestamp and buckets it by the calendar month it falls in for `tz`.
    ///
    /// - Timestamps with an offset (RFC 3339) are converted into `tz`.
    /// - Timestamps without an offset are wall-clock times in `tz`.
    /// - Bare dates (`YYYY-MM-DD`) are calendar dates and are not shifted.
    ///
    /// Returns `None` for anything that does not parse to a valid date.
    pub fn parse_in<Tz: TimeZone>(timestamp: &str, tz: &Tz) -> Option<Self> {
        let s = timestamp.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Self::from_date(dt.with_timezone(tz).date_naive());
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                // A wall-clock time skipped by a DST transition still names a valid day
                let date = match tz.from_local_datetime(&naive) {
                    LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.date_naive(),
                    LocalResult::None => naive.date(),
                };
                return Self::from_date(date);
            }
        }

        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(Self::from_date)
    }

    fn from_date(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month0() as usize)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_index(&self) -> usize {
        self.month_index
    }
}

impl Display for MonthBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", MONTH_NAMES[self.month_index], self.year)
    }
}
