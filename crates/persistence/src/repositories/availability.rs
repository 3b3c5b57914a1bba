//! Coach availability repository for database operations.

use chrono::NaiveDate;
use domain::models::availability::NewAvailability;
use domain::services::{evaluate_availability, AvailabilityRuleViolation};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{AvailabilitySlotEntity, CoachAvailabilityEntity};
use crate::metrics::QueryTimer;
use crate::repositories::{is_check_violation, is_overlap_violation};

/// Error creating an availability window.
#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error(transparent)]
    Rule(#[from] AvailabilityRuleViolation),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for AvailabilityError {
    fn from(err: sqlx::Error) -> Self {
        if is_overlap_violation(&err) {
            AvailabilityError::Rule(AvailabilityRuleViolation::OverlapsExisting)
        } else if is_check_violation(&err) {
            AvailabilityError::Rule(AvailabilityRuleViolation::InvalidTimeRange)
        } else {
            AvailabilityError::Database(err)
        }
    }
}

/// Slot listing: each window with its coach's name and the number of booked
/// reservations whose date/start/end equal the window's.
const SLOT_SELECT: &str = r#"
    SELECT a.id, a.coach_id, a.date, a.start_time, a.end_time, a.status, a.capacity,
           a.created_at,
           COALESCE(NULLIF(u.display_name, ''), u.username) AS coach_name,
           (
               SELECT COUNT(*)
               FROM reservations r
               WHERE r.coach_id = a.coach_id
                 AND r.date = a.date
                 AND r.start_time = a.start_time
                 AND r.end_time = a.end_time
                 AND r.status = 'booked'
           ) AS booked
    FROM coach_availabilities a
    JOIN users u ON u.id = a.coach_id
"#;

/// Repository for coach availability windows.
#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: PgPool,
}

impl AvailabilityRepository {
    /// Creates a new AvailabilityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an available window after checking it does not overlap the
    /// coach's other available windows that day.
    ///
    /// The coach's user row is locked so concurrent creates for one coach
    /// run one after the other; the exclusion constraint backs this up.
    pub async fn create(
        &self,
        coach_id: Uuid,
        new: &NewAvailability,
    ) -> Result<CoachAvailabilityEntity, AvailabilityError> {
        let timer = QueryTimer::new("create_availability");
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(coach_id)
            .fetch_one(&mut *tx)
            .await?;

        let overlaps: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM coach_availabilities
                WHERE coach_id = $1
                  AND date = $2
                  AND status = 'available'
                  AND start_time < $4
                  AND end_time > $3
            )
            "#,
        )
        .bind(coach_id)
        .bind(new.date)
        .bind(new.range.start())
        .bind(new.range.end())
        .fetch_one(&mut *tx)
        .await?;

        evaluate_availability(overlaps)?;

        let created = sqlx::query_as::<_, CoachAvailabilityEntity>(
            r#"
            INSERT INTO coach_availabilities (coach_id, date, start_time, end_time, status, capacity)
            VALUES ($1, $2, $3, $4, 'available', $5)
            RETURNING id, coach_id, date, start_time, end_time, status, capacity, created_at
            "#,
        )
        .bind(coach_id)
        .bind(new.date)
        .bind(new.range.start())
        .bind(new.range.end())
        .bind(new.capacity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(created)
    }

    /// A coach's windows with booked counts, ordered by date and start.
    ///
    /// With `from` set only windows on or after that date are returned.
    pub async fn list_for_coach(
        &self,
        coach_id: Uuid,
        from: Option<NaiveDate>,
    ) -> Result<Vec<AvailabilitySlotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_availability_for_coach");
        let result = sqlx::query_as::<_, AvailabilitySlotEntity>(&format!(
            r#"
            {SLOT_SELECT}
            WHERE a.coach_id = $1
              AND ($2::date IS NULL OR a.date >= $2)
            ORDER BY a.date, a.start_time
            "#
        ))
        .bind(coach_id)
        .bind(from)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a window by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<CoachAvailabilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_availability_by_id");
        let result = sqlx::query_as::<_, CoachAvailabilityEntity>(
            r#"
            SELECT id, coach_id, date, start_time, end_time, status, capacity, created_at
            FROM coach_availabilities
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a window owned by `coach_id`. Returns whether a row was removed.
    ///
    /// Existing reservations are kept; they simply no longer count against
    /// any window.
    pub async fn delete_for_coach(&self, id: Uuid, coach_id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_availability");
        let result = sqlx::query("DELETE FROM coach_availabilities WHERE id = $1 AND coach_id = $2")
            .bind(id)
            .bind(coach_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    /// Windows dated in `[start, end)` with booked counts, for the calendar.
    pub async fn slots_in_range(
        &self,
        coach_id: Option<Uuid>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<AvailabilitySlotEntity>, sqlx::Error> {
        let timer = QueryTimer::new("availability_slots_in_range");
        let result = sqlx::query_as::<_, AvailabilitySlotEntity>(&format!(
            r#"
            {SLOT_SELECT}
            WHERE a.date >= $1
              AND a.date < $2
              AND ($3::uuid IS NULL OR a.coach_id = $3)
            ORDER BY a.date, a.start_time, coach_name
            "#
        ))
        .bind(start)
        .bind(end)
        .bind(coach_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
