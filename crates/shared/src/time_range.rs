//! Time-of-day ranges and the overlap/containment predicates used by
//! bookings and coach availability.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when building or parsing time ranges.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeRangeError {
    #[error("End time must be after start time")]
    EndNotAfterStart,

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// A half-open `[start, end)` range within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: NaiveTime,
    end: NaiveTime,
}

impl TimeRange {
    /// Builds a range, rejecting `end <= start`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TimeRangeError> {
        if end <= start {
            return Err(TimeRangeError::EndNotAfterStart);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// Half-open intersection test: `start < other.end && end > other.start`.
    ///
    /// Ranges that only touch (09:00-10:00 and 10:00-11:00) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// True when `other` lies entirely inside this range.
    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Parses `HH:MM` (as sent by `<input type="time">`) or `HH:MM:SS`.
pub fn parse_time(value: &str) -> Result<NaiveTime, TimeRangeError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| TimeRangeError::InvalidTime(value.to_string()))
}

/// Parses an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate, TimeRangeError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| TimeRangeError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn range(sh: u32, eh: u32) -> TimeRange {
        TimeRange::new(t(sh, 0), t(eh, 0)).unwrap()
    }

    #[test]
    fn test_new_rejects_end_before_or_equal_start() {
        assert_eq!(
            TimeRange::new(t(10, 0), t(9, 0)),
            Err(TimeRangeError::EndNotAfterStart)
        );
        assert_eq!(
            TimeRange::new(t(10, 0), t(10, 0)),
            Err(TimeRangeError::EndNotAfterStart)
        );
    }

    #[test]
    fn test_overlaps() {
        assert!(range(9, 11).overlaps(&range(10, 12)));
        assert!(range(10, 12).overlaps(&range(9, 11)));
        assert!(range(9, 12).overlaps(&range(10, 11)));
        assert!(range(9, 10).overlaps(&range(9, 10)));
    }

    #[test]
    fn test_touching_ranges_do_not_overlap() {
        assert!(!range(9, 10).overlaps(&range(10, 11)));
        assert!(!range(10, 11).overlaps(&range(9, 10)));
    }

    #[test]
    fn test_contains() {
        assert!(range(9, 11).contains(&range(9, 10)));
        assert!(range(9, 11).contains(&range(10, 11)));
        assert!(range(9, 11).contains(&range(9, 11)));
        assert!(!range(9, 11).contains(&range(8, 10)));
        assert!(!range(9, 11).contains(&range(10, 12)));
    }

    #[test]
    fn test_duration_and_display() {
        let r = TimeRange::new(t(9, 0), t(10, 30)).unwrap();
        assert_eq!(r.duration_minutes(), 90);
        assert_eq!(r.to_string(), "09:00-10:30");
    }

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("09:00").unwrap(), t(9, 0));
        assert_eq!(parse_time("09:00:00").unwrap(), t(9, 0));
        assert_eq!(parse_time(" 18:45 ").unwrap(), t(18, 45));
        assert!(matches!(
            parse_time("9am"),
            Err(TimeRangeError::InvalidTime(_))
        ));
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert!(matches!(
            parse_date("01/05/2024"),
            Err(TimeRangeError::InvalidDate(_))
        ));
        assert!(parse_date("").is_err());
    }
}
