//! Coach availability entities (database row mappings).

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::models::{AvailabilitySlot, AvailabilityStatus, CoachAvailability};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the coach_availabilities table.
#[derive(Debug, Clone, FromRow)]
pub struct CoachAvailabilityEntity {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
}

impl From<CoachAvailabilityEntity> for CoachAvailability {
    fn from(entity: CoachAvailabilityEntity) -> Self {
        Self {
            id: entity.id,
            coach_id: entity.coach_id,
            date: entity.date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            status: AvailabilityStatus::parse(&entity.status)
                .unwrap_or(AvailabilityStatus::Unavailable),
            capacity: entity.capacity,
            created_at: entity.created_at,
        }
    }
}

/// An availability row joined with its coach's name and booked count.
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilitySlotEntity {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub capacity: i32,
    pub created_at: DateTime<Utc>,
    pub coach_name: String,
    pub booked: i64,
}

impl From<AvailabilitySlotEntity> for AvailabilitySlot {
    fn from(entity: AvailabilitySlotEntity) -> Self {
        let availability = CoachAvailabilityEntity {
            id: entity.id,
            coach_id: entity.coach_id,
            date: entity.date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            status: entity.status,
            capacity: entity.capacity,
            created_at: entity.created_at,
        };
        Self {
            availability: availability.into(),
            coach_name: entity.coach_name,
            booked: entity.booked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_entity_to_domain() {
        let entity = AvailabilitySlotEntity {
            id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status: "available".to_string(),
            capacity: 2,
            created_at: Utc::now(),
            coach_name: "Coach One".to_string(),
            booked: 1,
        };
        let slot: AvailabilitySlot = entity.into();
        assert_eq!(slot.availability.status, AvailabilityStatus::Available);
        assert_eq!(slot.remaining(), 1);
        assert_eq!(slot.coach_name, "Coach One");
    }

    #[test]
    fn test_unknown_status_is_not_bookable() {
        let entity = CoachAvailabilityEntity {
            id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            status: "maybe".to_string(),
            capacity: 1,
            created_at: Utc::now(),
        };
        let availability: CoachAvailability = entity.into();
        assert!(!availability.is_available());
    }
}
