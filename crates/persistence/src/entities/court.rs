//! Court entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Court;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the courts table.
#[derive(Debug, Clone, FromRow)]
pub struct CourtEntity {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<CourtEntity> for Court {
    fn from(entity: CourtEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            is_active: entity.is_active,
            created_at: entity.created_at,
        }
    }
}
