//! Shared utilities and common types for the tennis club backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (session tokens, hashing)
//! - Password hashing with Argon2id
//! - Time range arithmetic (overlap and containment)
//! - Common validation logic

pub mod crypto;
pub mod password;
pub mod time_range;
pub mod validation;
