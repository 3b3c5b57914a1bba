//! Calendar feed events built from availability slots.
//!
//! The JSON shape is what FullCalendar expects for an event source.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use shared::time_range::parse_date;
use thiserror::Error;
use uuid::Uuid;

use crate::models::availability::AvailabilitySlot;

/// Days shown when the client does not send `end`.
pub const DEFAULT_RANGE_DAYS: i64 = 42;

/// Widest range a single feed request may cover.
pub const MAX_RANGE_DAYS: i64 = 92;

const AVAILABLE_COLORS: EventColors = EventColors {
    background: "#2e7d32",
    border: "#1b5e20",
    text: "#ffffff",
};
const FULL_COLORS: EventColors = EventColors {
    background: "#c62828",
    border: "#8e0000",
    text: "#ffffff",
};
const UNAVAILABLE_COLORS: EventColors = EventColors {
    background: "#9e9e9e",
    border: "#616161",
    text: "#212121",
};

struct EventColors {
    background: &'static str,
    border: &'static str,
    text: &'static str,
}

/// Errors for malformed calendar feed queries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarQueryError {
    #[error("Invalid coach_id: {0}")]
    InvalidCoach(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("end must not be before start")]
    EndBeforeStart,

    #[error("Range must not exceed 92 days")]
    RangeTooLong,
}

/// Query string of `GET /api/calendar/events/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarQuery {
    pub coach_id: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// A resolved `[start, end)` date range, optionally for one coach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarRange {
    pub coach_id: Option<Uuid>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarQuery {
    /// Resolves the query against `today`. Blank parameters count as absent.
    pub fn resolve(&self, today: NaiveDate) -> Result<CalendarRange, CalendarQueryError> {
        let coach_id = match non_blank(&self.coach_id) {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| CalendarQueryError::InvalidCoach(raw.to_string()))?,
            ),
            None => None,
        };

        let start = match non_blank(&self.start) {
            Some(raw) => parse_calendar_bound(raw)?,
            None => today,
        };
        let end = match non_blank(&self.end) {
            Some(raw) => parse_calendar_bound(raw)?,
            None => start + Duration::days(DEFAULT_RANGE_DAYS),
        };

        if end < start {
            return Err(CalendarQueryError::EndBeforeStart);
        }
        if (end - start).num_days() > MAX_RANGE_DAYS {
            return Err(CalendarQueryError::RangeTooLong);
        }

        Ok(CalendarRange {
            coach_id,
            start,
            end,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD`, a naive ISO datetime, or RFC 3339 with offset.
///
/// A `+` in an offset arrives as a space when the client did not
/// percent-encode it, so that is repaired before parsing.
pub fn parse_calendar_bound(raw: &str) -> Result<NaiveDate, CalendarQueryError> {
    if let Ok(date) = parse_date(raw) {
        return Ok(date);
    }
    let repaired = raw.replace(' ', "+");
    if let Ok(dt) = DateTime::parse_from_rfc3339(&repaired) {
        return Ok(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|dt| dt.date())
        .map_err(|_| CalendarQueryError::InvalidDate(raw.to_string()))
}

/// What an event represents.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Available,
    Full,
    Unavailable,
}

/// Extra fields FullCalendar passes through untouched.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExtendedProps {
    pub kind: EventKind,
    pub capacity: i32,
    pub booked: i64,
    pub remaining: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_url: Option<String>,
}

/// One event of the calendar feed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start: String,
    pub end: String,
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
    pub extended_props: ExtendedProps,
}

impl CalendarEvent {
    /// Builds the event for a slot. The coach's name is prefixed to the title
    /// when the feed mixes several coaches.
    pub fn from_slot(slot: &AvailabilitySlot, with_coach_name: bool) -> Self {
        let window = &slot.availability;
        let remaining = slot.remaining();

        let (kind, colors) = if !window.is_available() {
            (EventKind::Unavailable, &UNAVAILABLE_COLORS)
        } else if remaining == 0 {
            (EventKind::Full, &FULL_COLORS)
        } else {
            (EventKind::Available, &AVAILABLE_COLORS)
        };

        let label = match kind {
            EventKind::Available => format!("Open {}/{}", remaining, window.capacity),
            EventKind::Full => format!("Full {}/{}", slot.booked, window.capacity),
            EventKind::Unavailable => "Unavailable".to_string(),
        };
        let title = if with_coach_name {
            format!("{} · {}", slot.coach_name, label)
        } else {
            label
        };

        let reservation_url = (kind == EventKind::Available).then(|| {
            reservation_url(
                window.coach_id,
                window.date,
                window.start_time,
                window.end_time,
            )
        });

        Self {
            title,
            start: iso_datetime(window.date, window.start_time),
            end: iso_datetime(window.date, window.end_time),
            background_color: colors.background.to_string(),
            border_color: colors.border.to_string(),
            text_color: colors.text.to_string(),
            extended_props: ExtendedProps {
                kind,
                capacity: window.capacity,
                booked: slot.booked,
                remaining,
                reservation_url,
            },
        }
    }
}

/// Booking form URL pre-filled for one slot.
pub fn reservation_url(coach_id: Uuid, date: NaiveDate, start: NaiveTime, end: NaiveTime) -> String {
    format!(
        "/reservations/new/?coach={}&date={}&start={}&end={}",
        coach_id,
        date.format("%Y-%m-%d"),
        start.format("%H:%M"),
        end.format("%H:%M")
    )
}

fn iso_datetime(date: NaiveDate, time: NaiveTime) -> String {
    date.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::availability::{AvailabilityStatus, CoachAvailability};
    use chrono::Utc;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn slot(capacity: i32, booked: i64, status: AvailabilityStatus) -> AvailabilitySlot {
        AvailabilitySlot {
            availability: CoachAvailability {
                id: Uuid::new_v4(),
                coach_id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
                date: d(2024, 5, 1),
                start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                status,
                capacity,
                created_at: Utc::now(),
            },
            coach_name: "Coach Sato".to_string(),
            booked,
        }
    }

    #[test]
    fn test_available_event() {
        let event = CalendarEvent::from_slot(&slot(2, 1, AvailabilityStatus::Available), false);
        assert_eq!(event.title, "Open 1/2");
        assert_eq!(event.start, "2024-05-01T09:00:00");
        assert_eq!(event.end, "2024-05-01T11:00:00");
        assert_eq!(event.extended_props.kind, EventKind::Available);
        assert_eq!(event.extended_props.capacity, 2);
        assert_eq!(event.extended_props.booked, 1);
        assert_eq!(event.extended_props.remaining, 1);
        assert_eq!(
            event.extended_props.reservation_url.as_deref(),
            Some("/reservations/new/?coach=550e8400-e29b-41d4-a716-446655440000&date=2024-05-01&start=09:00&end=11:00")
        );
    }

    #[test]
    fn test_full_event_has_no_url() {
        let event = CalendarEvent::from_slot(&slot(2, 2, AvailabilityStatus::Available), false);
        assert_eq!(event.extended_props.kind, EventKind::Full);
        assert_eq!(event.extended_props.remaining, 0);
        assert!(event.extended_props.reservation_url.is_none());
        assert_eq!(event.background_color, "#c62828");
    }

    #[test]
    fn test_unavailable_event() {
        let event = CalendarEvent::from_slot(&slot(3, 0, AvailabilityStatus::Unavailable), true);
        assert_eq!(event.extended_props.kind, EventKind::Unavailable);
        assert_eq!(event.title, "Coach Sato · Unavailable");
        assert!(event.extended_props.reservation_url.is_none());
    }

    #[test]
    fn test_event_json_field_names() {
        let event = CalendarEvent::from_slot(&slot(2, 0, AvailabilityStatus::Available), false);
        let json = serde_json::to_value(&event).unwrap();
        for key in [
            "title",
            "start",
            "end",
            "backgroundColor",
            "borderColor",
            "textColor",
            "extendedProps",
        ] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        let props = &json["extendedProps"];
        assert_eq!(props["kind"], "available");
        assert_eq!(props["capacity"], 2);
        assert_eq!(props["booked"], 0);
        assert_eq!(props["remaining"], 2);
        assert!(props["reservation_url"].is_string());

        let full = CalendarEvent::from_slot(&slot(1, 1, AvailabilityStatus::Available), false);
        let json = serde_json::to_value(&full).unwrap();
        assert!(json["extendedProps"].get("reservation_url").is_none());
    }

    #[test]
    fn test_parse_calendar_bound_formats() {
        assert_eq!(parse_calendar_bound("2024-05-01").unwrap(), d(2024, 5, 1));
        assert_eq!(
            parse_calendar_bound("2024-05-01T00:00:00+09:00").unwrap(),
            d(2024, 5, 1)
        );
        assert_eq!(
            parse_calendar_bound("2024-05-01T00:00:00 09:00").unwrap(),
            d(2024, 5, 1)
        );
        assert_eq!(
            parse_calendar_bound("2024-05-01T00:00:00").unwrap(),
            d(2024, 5, 1)
        );
        assert_eq!(
            parse_calendar_bound("2024-05-01T00:00:00Z").unwrap(),
            d(2024, 5, 1)
        );
        assert_eq!(
            parse_calendar_bound("2024-05-01T00:00:00.000").unwrap(),
            d(2024, 5, 1)
        );
        assert!(parse_calendar_bound("yesterday").is_err());
        assert!(parse_calendar_bound("2024-05-01garbage").is_err());
        assert!(parse_calendar_bound("2024-05-01T00:00:00junk").is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let today = d(2024, 5, 1);
        let range = CalendarQuery::default().resolve(today).unwrap();
        assert_eq!(range.coach_id, None);
        assert_eq!(range.start, today);
        assert_eq!(range.end, d(2024, 6, 12));
    }

    #[test]
    fn test_resolve_blank_coach_means_all() {
        let query = CalendarQuery {
            coach_id: Some("".to_string()),
            start: Some("2024-05-01".to_string()),
            end: Some("2024-05-08".to_string()),
        };
        let range = query.resolve(d(2024, 1, 1)).unwrap();
        assert_eq!(range.coach_id, None);
        assert_eq!(range.end, d(2024, 5, 8));
    }

    #[test]
    fn test_resolve_rejects_bad_input() {
        let today = d(2024, 5, 1);
        let bad_coach = CalendarQuery {
            coach_id: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            bad_coach.resolve(today),
            Err(CalendarQueryError::InvalidCoach(_))
        ));

        let backwards = CalendarQuery {
            coach_id: None,
            start: Some("2024-05-10".to_string()),
            end: Some("2024-05-01".to_string()),
        };
        assert_eq!(
            backwards.resolve(today),
            Err(CalendarQueryError::EndBeforeStart)
        );

        let too_long = CalendarQuery {
            coach_id: None,
            start: Some("2024-01-01".to_string()),
            end: Some("2024-12-31".to_string()),
        };
        assert_eq!(too_long.resolve(today), Err(CalendarQueryError::RangeTooLong));
    }
}
