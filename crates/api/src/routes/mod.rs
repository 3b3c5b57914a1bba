//! HTTP route handlers.

pub mod auth;
pub mod availability;
pub mod calendar;
pub mod health;
pub mod home;
pub mod reservations;
