//! Repository implementations for database operations.

pub mod availability;
pub mod court;
pub mod reservation;
pub mod user;

pub use availability::{AvailabilityError, AvailabilityRepository};
pub use court::CourtRepository;
pub use reservation::{BookingError, ReservationRepository};
pub use user::UserRepository;

/// SQLSTATE raised by unique indexes (23505) and exclusion constraints (23P01).
pub(crate) fn is_overlap_violation(err: &sqlx::Error) -> bool {
    matches!(sqlstate(err).as_deref(), Some("23505") | Some("23P01"))
}

/// SQLSTATE 23514, raised by the `end_time > start_time` checks.
pub(crate) fn is_check_violation(err: &sqlx::Error) -> bool {
    sqlstate(err).as_deref() == Some("23514")
}

fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}
