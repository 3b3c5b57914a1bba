//! Court repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::CourtEntity;
use crate::metrics::QueryTimer;

/// Repository for courts.
#[derive(Clone)]
pub struct CourtRepository {
    pool: PgPool,
}

impl CourtRepository {
    /// Creates a new CourtRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active courts ordered by name.
    pub async fn list_active(&self) -> Result<Vec<CourtEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_active_courts");
        let result = sqlx::query_as::<_, CourtEntity>(
            r#"
            SELECT id, name, is_active, created_at
            FROM courts
            WHERE is_active = true
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a court by ID, active or not.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CourtEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_court_by_id");
        let result = sqlx::query_as::<_, CourtEntity>(
            "SELECT id, name, is_active, created_at FROM courts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a court by its unique name.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<CourtEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_court_by_name");
        let result = sqlx::query_as::<_, CourtEntity>(
            "SELECT id, name, is_active, created_at FROM courts WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert an active court unless one with this name exists.
    ///
    /// Returns the court and whether it was created.
    pub async fn create_if_missing(&self, name: &str) -> Result<(CourtEntity, bool), sqlx::Error> {
        let timer = QueryTimer::new("create_court_if_missing");
        let inserted = sqlx::query_as::<_, CourtEntity>(
            r#"
            INSERT INTO courts (name)
            VALUES ($1)
            ON CONFLICT (name) DO NOTHING
            RETURNING id, name, is_active, created_at
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await;
        timer.record();

        match inserted? {
            Some(court) => Ok((court, true)),
            None => self
                .find_by_name(name)
                .await?
                .map(|court| (court, false))
                .ok_or(sqlx::Error::RowNotFound),
        }
    }
}
