//! Booking and availability rules.
//!
//! The persistence layer gathers a [`BookingSnapshot`] inside the booking
//! transaction (overlap query, the coach's locked windows, the slot count)
//! and asks [`evaluate_booking`] whether the insert may proceed.

use shared::time_range::{TimeRange, TimeRangeError};
use thiserror::Error;

use crate::models::availability::CoachAvailability;

/// Why a booking was refused. The display text is shown on the form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BookingRuleViolation {
    #[error("End time must be after start time.")]
    InvalidTimeRange,

    #[error("This court already has a booking that overlaps this time.")]
    CourtOverlap,

    #[error("No court is free for this time.")]
    NoCourtAvailable,

    #[error("The selected court is not available.")]
    CourtNotFound,

    #[error("The selected coach does not exist.")]
    CoachNotFound,

    #[error("The coach is not available for the whole of this time.")]
    OutsideAvailability,

    #[error("This slot is full (capacity {capacity}).")]
    SlotFull { capacity: i32 },
}

impl BookingRuleViolation {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::InvalidTimeRange => "invalid_time_range",
            Self::CourtOverlap => "court_overlap",
            Self::NoCourtAvailable => "no_court_available",
            Self::CourtNotFound => "court_not_found",
            Self::CoachNotFound => "coach_not_found",
            Self::OutsideAvailability => "outside_availability",
            Self::SlotFull { .. } => "slot_full",
        }
    }
}

impl From<TimeRangeError> for BookingRuleViolation {
    fn from(_: TimeRangeError) -> Self {
        BookingRuleViolation::InvalidTimeRange
    }
}

/// Why an availability window was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AvailabilityRuleViolation {
    #[error("End time must be after start time.")]
    InvalidTimeRange,

    #[error("You already have an availability window overlapping this time.")]
    OverlapsExisting,
}

impl From<TimeRangeError> for AvailabilityRuleViolation {
    fn from(_: TimeRangeError) -> Self {
        AvailabilityRuleViolation::InvalidTimeRange
    }
}

/// The coach window a booking falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    pub range: TimeRange,
    pub capacity: i32,
}

/// Everything the rules need, read under the booking transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingSnapshot {
    pub requested: TimeRange,
    /// A booked reservation on the same court and date overlaps `requested`.
    pub court_conflict: bool,
    /// The coach's available window containing `requested`, if any.
    pub window: Option<WindowSnapshot>,
    /// Booked reservations of the coach with exactly this date/start/end.
    pub booked_in_slot: i64,
}

/// Applies the rules in order: court overlap, coach availability, capacity.
pub fn evaluate_booking(snapshot: &BookingSnapshot) -> Result<(), BookingRuleViolation> {
    if snapshot.court_conflict {
        return Err(BookingRuleViolation::CourtOverlap);
    }

    let window = snapshot
        .window
        .filter(|w| w.range.contains(&snapshot.requested))
        .ok_or(BookingRuleViolation::OutsideAvailability)?;

    if snapshot.booked_in_slot >= i64::from(window.capacity) {
        return Err(BookingRuleViolation::SlotFull {
            capacity: window.capacity,
        });
    }

    Ok(())
}

/// Picks the available window that fully contains `requested`.
///
/// Available windows of one coach never overlap, so at most one matches.
pub fn find_containing_window<'a>(
    requested: &TimeRange,
    windows: &'a [CoachAvailability],
) -> Option<&'a CoachAvailability> {
    windows.iter().find(|w| {
        w.is_available()
            && w.time_range()
                .map(|range| range.contains(requested))
                .unwrap_or(false)
    })
}

/// A new available window may not overlap the coach's other available
/// windows on the same date.
pub fn evaluate_availability(
    overlaps_existing: bool,
) -> Result<(), AvailabilityRuleViolation> {
    if overlaps_existing {
        return Err(AvailabilityRuleViolation::OverlapsExisting);
    }
    Ok(())
}
