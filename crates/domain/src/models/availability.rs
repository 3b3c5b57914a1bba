//! Coach availability windows.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::time_range::{parse_date, parse_time, TimeRange};
use shared::validation::validate_capacity;
use uuid::Uuid;
use validator::Validate;

use crate::models::form::FormErrors;

/// Whether a window accepts bookings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Unavailable,
}

impl AvailabilityStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "available",
            AvailabilityStatus::Unavailable => "unavailable",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(AvailabilityStatus::Available),
            "unavailable" => Some(AvailabilityStatus::Unavailable),
            _ => None,
        }
    }
}

/// A coach's offered time window on one date.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachAvailability {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: AvailabilityStatus,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl CoachAvailability {
    /// The window's range. `None` only for rows that violate the
    /// `end_time > start_time` check.
    pub fn time_range(&self) -> Option<TimeRange> {
        TimeRange::new(self.start_time, self.end_time).ok()
    }

    pub fn is_available(&self) -> bool {
        self.status == AvailabilityStatus::Available
    }
}

/// A window together with how many bookings occupy it.
#[derive(Debug, Clone)]
pub struct AvailabilitySlot {
    pub availability: CoachAvailability,
    pub coach_name: String,
    /// Booked reservations of this coach whose date/start/end equal the window's.
    pub booked: i64,
}

impl AvailabilitySlot {
    pub fn remaining(&self) -> i64 {
        (i64::from(self.availability.capacity) - self.booked).max(0)
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }
}

/// Raw availability form as posted from `/coach/availability/new/`.
///
/// HTML inputs post empty strings for blank fields, so everything arrives
/// as text and is parsed in [`AvailabilityForm::clean`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct AvailabilityForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Start time is required"))]
    pub start_time: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "End time is required"))]
    pub end_time: String,

    #[serde(default)]
    pub capacity: String,
}

/// A validated availability window ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAvailability {
    pub date: NaiveDate,
    pub range: TimeRange,
    pub capacity: i32,
}

impl AvailabilityForm {
    /// Validates and parses the form. Blank capacity defaults to 1.
    pub fn clean(&self) -> Result<NewAvailability, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let date = if errors.has_field("date") {
            None
        } else {
            parse_date(&self.date)
                .map_err(|_| errors.add("date", "Enter a valid date (YYYY-MM-DD)"))
                .ok()
        };
        let start = if errors.has_field("start_time") {
            None
        } else {
            parse_time(&self.start_time)
                .map_err(|_| errors.add("start_time", "Enter a valid time (HH:MM)"))
                .ok()
        };
        let end = if errors.has_field("end_time") {
            None
        } else {
            parse_time(&self.end_time)
                .map_err(|_| errors.add("end_time", "Enter a valid time (HH:MM)"))
                .ok()
        };

        let capacity = match self.capacity.trim() {
            "" => Some(1),
            raw => match raw.parse::<i32>() {
                Ok(value) => match validate_capacity(value) {
                    Ok(()) => Some(value),
                    Err(e) => {
                        let message = e
                            .message
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Invalid capacity".to_string());
                        errors.add("capacity", message);
                        None
                    }
                },
                Err(_) => {
                    errors.add("capacity", "Capacity must be a whole number");
                    None
                }
            },
        };

        let range = match (start, end) {
            (Some(start), Some(end)) => match TimeRange::new(start, end) {
                Ok(range) => Some(range),
                Err(e) => {
                    errors.add_non_field(e.to_string());
                    None
                }
            },
            _ => None,
        };

        match (date, range, capacity) {
            (Some(date), Some(range), Some(capacity)) if errors.is_empty() => Ok(NewAvailability {
                date,
                range,
                capacity,
            }),
            _ => Err(errors),
        }
    }
}
