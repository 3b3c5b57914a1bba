//! Court domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest court name the `courts.name` column accepts.
pub const MAX_COURT_NAME_LEN: usize = 50;

/// A bookable court. Inactive courts are hidden from the booking form and
/// never auto-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Court {
    /// Whether `name` can be stored as a court name.
    pub fn is_valid_name(name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && name.chars().count() <= MAX_COURT_NAME_LEN
    }
}
