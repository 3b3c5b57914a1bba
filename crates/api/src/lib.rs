//! Web front end of the tennis club reservation service.
//!
//! Server-rendered pages for booking courts against coach availability,
//! coach slot management, and the calendar feed.

pub mod app;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod templates;
