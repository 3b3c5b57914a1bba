//! Reservation repository for database operations.

use chrono::{Datelike, NaiveDate};
use domain::models::reservation::{CancelOutcome, NewReservation, ReservationTab};
use domain::models::CoachAvailability;
use domain::services::{
    evaluate_booking, find_containing_window, BookingRuleViolation, BookingSnapshot,
    WindowSnapshot,
};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{
    CoachAvailabilityEntity, CourtEntity, ReservationDetailsEntity, ReservationEntity,
};
use crate::metrics::QueryTimer;
use crate::repositories::{is_check_violation, is_overlap_violation};

/// Error creating a booking.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error(transparent)]
    Rule(#[from] BookingRuleViolation),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for BookingError {
    fn from(err: sqlx::Error) -> Self {
        if is_overlap_violation(&err) {
            BookingError::Rule(BookingRuleViolation::CourtOverlap)
        } else if is_check_violation(&err) {
            BookingError::Rule(BookingRuleViolation::InvalidTimeRange)
        } else {
            BookingError::Database(err)
        }
    }
}

/// First key of the per-date advisory lock taken while a court is chosen.
const COURT_ALLOCATION_LOCK: i32 = 0x636f_7572;

const RESERVATION_COLUMNS: &str =
    "id, customer_id, court_id, coach_id, date, start_time, end_time, status, created_at";

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.customer_id,
           cu.username AS customer_name,
           ct.name AS court_name,
           COALESCE(NULLIF(co.display_name, ''), co.username) AS coach_name,
           r.date, r.start_time, r.end_time, r.status, r.created_at
    FROM reservations r
    JOIN users cu ON cu.id = r.customer_id
    JOIN courts ct ON ct.id = r.court_id
    LEFT JOIN users co ON co.id = r.coach_id
"#;

/// Repository for reservations.
#[derive(Clone)]
pub struct ReservationRepository {
    pool: PgPool,
}

impl ReservationRepository {
    /// Creates a new ReservationRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Book a court (chosen, or the first free active one by name) with a
    /// coach, in one transaction.
    ///
    /// Court allocation is serialized per date with a transaction-scoped
    /// advisory lock, so two bookings for different coaches cannot both pick
    /// the same free court. The coach's available windows on the date are
    /// then locked `FOR UPDATE` before counting, so two bookings for the same
    /// slot cannot both see a free place.
    pub async fn create_booking(
        &self,
        customer_id: Uuid,
        new: &NewReservation,
    ) -> Result<ReservationEntity, BookingError> {
        let timer = QueryTimer::new("create_booking");
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(COURT_ALLOCATION_LOCK)
            .bind(new.date.num_days_from_ce())
            .execute(&mut *tx)
            .await?;

        let coach_exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND role = 'coach' AND is_active = true)",
        )
        .bind(new.coach_id)
        .fetch_one(&mut *tx)
        .await?;
        if !coach_exists {
            return Err(BookingRuleViolation::CoachNotFound.into());
        }

        let windows: Vec<CoachAvailability> = sqlx::query_as::<_, CoachAvailabilityEntity>(
            r#"
            SELECT id, coach_id, date, start_time, end_time, status, capacity, created_at
            FROM coach_availabilities
            WHERE coach_id = $1 AND date = $2 AND status = 'available'
            ORDER BY start_time
            FOR UPDATE
            "#,
        )
        .bind(new.coach_id)
        .bind(new.date)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        let (court_id, court_conflict) = match new.court_id {
            Some(court_id) => {
                let active: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM courts WHERE id = $1 AND is_active = true)",
                )
                .bind(court_id)
                .fetch_one(&mut *tx)
                .await?;
                if !active {
                    return Err(BookingRuleViolation::CourtNotFound.into());
                }

                let conflict: bool = sqlx::query_scalar(
                    r#"
                    SELECT EXISTS (
                        SELECT 1
                        FROM reservations
                        WHERE court_id = $1
                          AND date = $2
                          AND status = 'booked'
                          AND start_time < $4
                          AND end_time > $3
                    )
                    "#,
                )
                .bind(court_id)
                .bind(new.date)
                .bind(new.range.start())
                .bind(new.range.end())
                .fetch_one(&mut *tx)
                .await?;
                (court_id, conflict)
            }
            None => {
                let free = sqlx::query_as::<_, CourtEntity>(
                    r#"
                    SELECT c.id, c.name, c.is_active, c.created_at
                    FROM courts c
                    WHERE c.is_active = true
                      AND NOT EXISTS (
                          SELECT 1
                          FROM reservations r
                          WHERE r.court_id = c.id
                            AND r.date = $1
                            AND r.status = 'booked'
                            AND r.start_time < $3
                            AND r.end_time > $2
                      )
                    ORDER BY c.name
                    LIMIT 1
                    "#,
                )
                .bind(new.date)
                .bind(new.range.start())
                .bind(new.range.end())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(BookingRuleViolation::NoCourtAvailable)?;
                (free.id, false)
            }
        };

        let booked_in_slot: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM reservations
            WHERE coach_id = $1
              AND date = $2
              AND start_time = $3
              AND end_time = $4
              AND status = 'booked'
            "#,
        )
        .bind(new.coach_id)
        .bind(new.date)
        .bind(new.range.start())
        .bind(new.range.end())
        .fetch_one(&mut *tx)
        .await?;

        let window = find_containing_window(&new.range, &windows).and_then(|w| {
            w.time_range().map(|range| WindowSnapshot {
                range,
                capacity: w.capacity,
            })
        });

        evaluate_booking(&BookingSnapshot {
            requested: new.range,
            court_conflict,
            window,
            booked_in_slot,
        })?;

        let created = sqlx::query_as::<_, ReservationEntity>(&format!(
            r#"
            INSERT INTO reservations (customer_id, court_id, coach_id, date, start_time, end_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, 'booked')
            RETURNING {RESERVATION_COLUMNS}
            "#
        ))
        .bind(customer_id)
        .bind(court_id)
        .bind(new.coach_id)
        .bind(new.date)
        .bind(new.range.start())
        .bind(new.range.end())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(created)
    }

    /// A customer's reservations of every status.
    ///
    /// Future is `date >= today` ascending, past is `date < today` descending.
    pub async fn list_for_customer(
        &self,
        customer_id: Uuid,
        tab: ReservationTab,
        today: NaiveDate,
    ) -> Result<Vec<ReservationDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_reservations_for_customer");
        let filter = match tab {
            ReservationTab::Future => {
                "r.date >= $2 ORDER BY r.date ASC, r.start_time ASC, ct.name ASC"
            }
            ReservationTab::Past => {
                "r.date < $2 ORDER BY r.date DESC, r.start_time DESC, ct.name ASC"
            }
        };
        let result = sqlx::query_as::<_, ReservationDetailsEntity>(&format!(
            "{DETAILS_SELECT} WHERE r.customer_id = $1 AND {filter}"
        ))
        .bind(customer_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Booked reservations on a date, ordered by court name and start.
    pub async fn list_booked_on_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ReservationDetailsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_booked_on_date");
        let result = sqlx::query_as::<_, ReservationDetailsEntity>(&format!(
            r#"
            {DETAILS_SELECT}
            WHERE r.date = $1 AND r.status = 'booked'
            ORDER BY ct.name, r.start_time
            "#
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a reservation by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReservationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reservation_by_id");
        let result = sqlx::query_as::<_, ReservationEntity>(&format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Move a reservation from booked to cancelled. A second cancel is a no-op.
    pub async fn cancel(&self, id: Uuid) -> Result<CancelOutcome, sqlx::Error> {
        let timer = QueryTimer::new("cancel_reservation");
        let result = sqlx::query(
            "UPDATE reservations SET status = 'cancelled' WHERE id = $1 AND status = 'booked'",
        )
        .bind(id)
        .execute(&self.pool)
        .await;
        timer.record();

        if result?.rows_affected() > 0 {
            Ok(CancelOutcome::Cancelled)
        } else {
            Ok(CancelOutcome::AlreadyCancelled)
        }
    }
}
