//! User repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use studio_core::result::AppResult;
use studio_core::types::{PageRequest, PageResponse, UserId};
use studio_entity::user::{CreateUser, UpdateUser, User};

use super::{db_error, map_write_error};
use crate::store::UserStore;

/// Repository for user CRUD and query operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by id"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by email"))
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE reset_token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find user by reset token"))
    }

    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<User>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count users"))?;

        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users ORDER BY surname, name, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list users"))?;

        Ok(PageResponse::new(users, page, total.max(0) as u64))
    }

    async fn list_unpaid_members(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE role = 'user' AND paid = FALSE ORDER BY surname, name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list unpaid members"))
    }

    async fn create(&self, data: CreateUser, now: DateTime<Utc>) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, name, surname, email, phone, weekly_quota, password_hash, \
             paid, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $9, $9) \
             RETURNING *",
        )
        .bind(UserId::new())
        .bind(&data.name)
        .bind(&data.surname)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(data.weekly_quota)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "Failed to create user", "Email is already registered"))
    }

    async fn update(
        &self,
        id: UserId,
        changes: UpdateUser,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let Some(mut user) =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(db_error("Failed to lock user"))?
        else {
            return Ok(None);
        };

        let quota_changed = user.apply_update(changes, now);

        let updated = sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2, surname = $3, email = $4, phone = $5, \
             weekly_quota = $6, role = $7, paid = $8, paid_at = $9, updated_at = $10 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.weekly_quota)
        .bind(user.role)
        .bind(user.paid)
        .bind(user.paid_at)
        .bind(user.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "Failed to update user", "Email is already registered"))?;

        if quota_changed {
            sqlx::query("DELETE FROM user_selections WHERE user_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_error("Failed to drop ledger after quota change"))?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit user update"))?;
        Ok(Some(updated))
    }

    async fn set_paid(
        &self,
        id: UserId,
        paid: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET \
             paid_at = CASE WHEN $2 AND NOT paid THEN $3 WHEN $2 THEN paid_at ELSE NULL END, \
             paid = $2, updated_at = $3 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(paid)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update payment flag"))
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET reset_token_hash = $2, reset_token_expires_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to store reset token"))?;
        Ok(())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE users SET password_hash = $2, reset_token_hash = NULL, \
             reset_token_expires_at = NULL, updated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update password"))?;
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        // Ledger and turns go with the user through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset_all_payments(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET paid = FALSE, paid_at = NULL, updated_at = $1 WHERE paid = TRUE",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to reset payment flags"))?;
        Ok(result.rows_affected())
    }
}
