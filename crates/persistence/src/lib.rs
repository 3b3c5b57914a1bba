//! Persistence layer for the tennis club.
//!
//! This crate contains:
//! - Database connection management
//! - SQL migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

/// Migrations embedded at compile time.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./src/migrations");
