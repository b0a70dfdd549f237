//! Info-notice repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use studio_core::result::AppResult;
use studio_core::types::NoticeId;
use studio_entity::notice::{CreateNotice, InfoNotice};

use super::db_error;
use crate::store::NoticeStore;

#[derive(Debug, Clone)]
pub struct NoticeRepository {
    pool: PgPool,
}

impl NoticeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoticeStore for NoticeRepository {
    async fn create(&self, data: CreateNotice, now: DateTime<Utc>) -> AppResult<InfoNotice> {
        sqlx::query_as::<_, InfoNotice>(
            "INSERT INTO info_notices (id, title, description, link, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(NoticeId::new())
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.link)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to publish notice"))
    }

    async fn latest(&self) -> AppResult<Option<InfoNotice>> {
        sqlx::query_as::<_, InfoNotice>(
            "SELECT * FROM info_notices ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to load latest notice"))
    }

    async fn clear(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM info_notices")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to clear notices"))?;
        Ok(result.rows_affected())
    }
}
