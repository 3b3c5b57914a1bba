//! Domain services for the tennis club.
//!
//! Services contain business logic that operates on domain models.

pub mod booking;

pub use booking::{
    evaluate_availability, evaluate_booking, find_containing_window, AvailabilityRuleViolation,
    BookingRuleViolation, BookingSnapshot, WindowSnapshot,
};
