//! Database entity definitions.

pub mod availability;
pub mod court;
pub mod reservation;
pub mod user;

pub use availability::{AvailabilitySlotEntity, CoachAvailabilityEntity};
pub use court::CourtEntity;
pub use reservation::{ReservationDetailsEntity, ReservationEntity};
pub use user::{UserEntity, UserSessionEntity};
