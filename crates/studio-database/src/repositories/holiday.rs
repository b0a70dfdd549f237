//! Holiday repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use studio_core::result::AppResult;
use studio_core::types::HolidayId;
use studio_entity::holiday::Holiday;

use super::{db_error, map_write_error};
use crate::store::HolidayStore;

#[derive(Debug, Clone)]
pub struct HolidayRepository {
    pool: PgPool,
}

impl HolidayRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolidayStore for HolidayRepository {
    async fn create(
        &self,
        date: NaiveDate,
        description: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Holiday> {
        sqlx::query_as::<_, Holiday>(
            "INSERT INTO holidays (id, date, description, created_at) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(HolidayId::new())
        .bind(date)
        .bind(description)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to mark holiday", "Date is already a holiday"))
    }

    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Option<Holiday>> {
        sqlx::query_as::<_, Holiday>("SELECT * FROM holidays WHERE date = $1")
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find holiday"))
    }

    async fn list(&self) -> AppResult<Vec<Holiday>> {
        sqlx::query_as::<_, Holiday>("SELECT * FROM holidays ORDER BY date")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list holidays"))
    }

    async fn delete_by_date(&self, date: NaiveDate) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM holidays WHERE date = $1")
            .bind(date)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to remove holiday"))?;
        Ok(result.rows_affected() > 0)
    }
}
