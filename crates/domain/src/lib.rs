//! Domain layer for the tennis club reservation service.
//!
//! This crate contains:
//! - Domain models (User, Court, CoachAvailability, Reservation)
//! - Form payloads and their validation
//! - Booking rule evaluation and calendar event building

pub mod models;
pub mod services;
