//! Reservation entities (database row mappings).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{Reservation, ReservationDetails, ReservationStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the reservations table.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationEntity {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub court_id: Uuid,
    pub coach_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

fn parse_status(raw: &str) -> ReservationStatus {
    ReservationStatus::parse(raw).unwrap_or(ReservationStatus::Cancelled)
}

impl From<ReservationEntity> for Reservation {
    fn from(entity: ReservationEntity) -> Self {
        Self {
            id: entity.id,
            customer_id: entity.customer_id,
            court_id: entity.court_id,
            coach_id: entity.coach_id,
            date: entity.date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            status: parse_status(&entity.status),
            created_at: entity.created_at,
        }
    }
}

/// A reservation row joined with customer, court and coach names.
#[derive(Debug, Clone, FromRow)]
pub struct ReservationDetailsEntity {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub court_name: String,
    pub coach_name: Option<String>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReservationDetailsEntity> for ReservationDetails {
    fn from(entity: ReservationDetailsEntity) -> Self {
        Self {
            id: entity.id,
            customer_id: entity.customer_id,
            customer_name: entity.customer_name,
            court_name: entity.court_name,
            coach_name: entity.coach_name,
            date: entity.date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            status: parse_status(&entity.status),
            created_at: entity.created_at,
        }
    }
}
