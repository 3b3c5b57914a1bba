//! Reservation domain model and booking form.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::time_range::{parse_date, parse_time, TimeRange};
use uuid::Uuid;
use validator::Validate;

use crate::models::form::FormErrors;

/// Lifecycle of a reservation. The only transition is booked -> cancelled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    #[default]
    Booked,
    Cancelled,
}

impl ReservationStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationStatus::Booked => "booked",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "booked" => Some(ReservationStatus::Booked),
            "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

/// A customer's booking of a court, optionally with a coach.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub court_id: Uuid,
    pub coach_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_booked(&self) -> bool {
        self.status == ReservationStatus::Booked
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.customer_id == user_id
    }
}

/// A reservation joined with the names needed to list it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetails {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub court_name: String,
    pub coach_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
}

/// Which half of the reservation list to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReservationTab {
    #[default]
    Future,
    Past,
}

impl ReservationTab {
    /// Anything other than `past` falls back to the future tab.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("past") => ReservationTab::Past,
            _ => ReservationTab::Future,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationTab::Future => "future",
            ReservationTab::Past => "past",
        }
    }
}

/// Result of a cancel request on an owned reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    AlreadyCancelled,
}

impl CancelOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            CancelOutcome::Cancelled => "Your reservation has been cancelled.",
            CancelOutcome::AlreadyCancelled => "This reservation was already cancelled.",
        }
    }
}

/// Query parameters that pre-fill the booking form, e.g. from a calendar
/// event's `reservation_url`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationPrefill {
    pub coach: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Raw booking form as posted from `/reservations/new/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ReservationForm {
    /// Court id, or empty to let the club pick a free court.
    #[serde(default)]
    pub court: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Please choose a coach."))]
    pub coach: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Start time is required"))]
    pub start_time: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "End time is required"))]
    pub end_time: String,
}

/// A validated booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    pub court_id: Option<Uuid>,
    pub coach_id: Uuid,
    pub date: NaiveDate,
    pub range: TimeRange,
}

impl ReservationForm {
    /// Builds an unbound form from pre-fill query parameters.
    pub fn from_prefill(prefill: &ReservationPrefill) -> Self {
        Self {
            court: String::new(),
            coach: prefill.coach.clone().unwrap_or_default(),
            date: prefill.date.clone().unwrap_or_default(),
            start_time: prefill.start.clone().unwrap_or_default(),
            end_time: prefill.end.clone().unwrap_or_default(),
        }
    }

    /// Validates and parses the form.
    pub fn clean(&self) -> Result<NewReservation, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let court_id = match self.court.trim() {
            "" => None,
            raw => Uuid::parse_str(raw)
                .map_err(|_| errors.add("court", "Select a valid court"))
                .ok(),
        };
        let coach_id = if errors.has_field("coach") {
            None
        } else {
            Uuid::parse_str(self.coach.trim())
                .map_err(|_| errors.add("coach", "Select a valid coach"))
                .ok()
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

        match (coach_id, date, range) {
            (Some(coach_id), Some(date), Some(range)) if errors.is_empty() => Ok(NewReservation {
                court_id,
                coach_id,
                date,
                range,
            }),
            _ => Err(errors),
        }
    }
}
