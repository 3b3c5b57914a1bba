//! Domain models for the tennis club.

pub mod availability;
pub mod calendar;
pub mod court;
pub mod form;
pub mod reservation;
pub mod user;

pub use availability::{AvailabilitySlot, AvailabilityStatus, CoachAvailability};
pub use calendar::CalendarEvent;
pub use court::Court;
pub use form::FormErrors;
pub use reservation::{Reservation, ReservationDetails, ReservationStatus};
pub use user::{User, UserRole, UserSession};
