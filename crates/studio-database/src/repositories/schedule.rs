//! Slot ledger and recoverable-turn repository.
//!
//! Selections are JSONB arrays of `{"day", "hour"}` objects. A member's
//! effective array is `temporary_selections` when non-empty, otherwise
//! `original_selections`; occupancy is JSONB containment on that array.
//!
//! Writes that can raise a slot's occupancy take a transaction-scoped
//! advisory lock per slot (in sorted order), recount inside the
//! transaction, and then write guarded by the ledger `version`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::debug;

use studio_core::result::AppResult;
use studio_core::types::{TurnId, UserId};
use studio_entity::schedule::{SlotSelection, UserSelection};
use studio_entity::turn::{RecoverableTurn, RedeemedTurn, TurnStatus};
use studio_entity::user::UserSummary;

use super::{db_error, map_write_error};
use crate::store::{CommitOutcome, MemberSelection, ScheduleStore, SelectionCommit};

/// Advisory-lock namespace for slot occupancy.
const SLOT_LOCK_NAMESPACE: i32 = 0x5107;

const EFFECTIVE_SELECTIONS: &str = "CASE WHEN jsonb_array_length(temporary_selections) > 0 \
     THEN temporary_selections ELSE original_selections END";

#[derive(Debug, FromRow)]
struct MemberSelectionRow {
    #[sqlx(flatten)]
    selection: UserSelection,
    name: String,
    surname: String,
}

/// Repository for the slot ledger and recoverable turns.
#[derive(Debug, Clone)]
pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    /// Create a new schedule repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_slot(conn: &mut PgConnection, slot: &SlotSelection) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, hashtext($2))")
        .bind(SLOT_LOCK_NAMESPACE)
        .bind(slot.key())
        .execute(conn)
        .await
        .map_err(db_error("Failed to lock slot"))?;
    Ok(())
}

async fn count_effective(
    conn: &mut PgConnection,
    slot: &SlotSelection,
    exclude: Option<UserId>,
) -> AppResult<u32> {
    let sql = format!(
        "SELECT COUNT(*) FROM user_selections \
         WHERE ({EFFECTIVE_SELECTIONS}) @> $1 AND ($2::uuid IS NULL OR user_id <> $2)"
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(Json(vec![slot.clone()]))
        .bind(exclude)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to count slot occupants"))?;
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Lock and recount every guarded slot. Returns the first full slot.
async fn check_guard(
    conn: &mut PgConnection,
    commit: &SelectionCommit,
) -> AppResult<Option<SlotSelection>> {
    let guard = commit.ordered_guard();
    for slot in &guard {
        lock_slot(conn, slot).await?;
    }
    for slot in guard {
        let taken = count_effective(conn, &slot, Some(commit.next.user_id)).await?;
        if taken >= commit.capacity {
            return Ok(Some(slot));
        }
    }
    Ok(None)
}

/// Insert or version-checked update of a ledger row. `None` when the
/// write lost a race.
async fn write_selection(
    conn: &mut PgConnection,
    commit: &SelectionCommit,
) -> AppResult<Option<UserSelection>> {
    let next = &commit.next;
    match commit.expected_version {
        None => sqlx::query_as::<_, UserSelection>(
            "INSERT INTO user_selections (user_id, original_selections, temporary_selections, \
             changes_this_month, last_change, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, 0, $6, $6) \
             ON CONFLICT (user_id) DO NOTHING RETURNING *",
        )
        .bind(next.user_id)
        .bind(Json(&next.original_selections))
        .bind(Json(&next.temporary_selections))
        .bind(next.changes_this_month)
        .bind(next.last_change)
        .bind(next.updated_at)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to create ledger")),
        Some(version) => sqlx::query_as::<_, UserSelection>(
            "UPDATE user_selections SET original_selections = $2, temporary_selections = $3, \
             changes_this_month = $4, last_change = $5, version = version + 1, updated_at = $6 \
             WHERE user_id = $1 AND version = $7 RETURNING *",
        )
        .bind(next.user_id)
        .bind(Json(&next.original_selections))
        .bind(Json(&next.temporary_selections))
        .bind(next.changes_this_month)
        .bind(next.last_change)
        .bind(next.updated_at)
        .bind(version)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Failed to update ledger")),
    }
}

#[async_trait]
impl ScheduleStore for ScheduleRepository {
    async fn find_selection(&self, user_id: UserId) -> AppResult<Option<UserSelection>> {
        sqlx::query_as::<_, UserSelection>("SELECT * FROM user_selections WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find ledger"))
    }

    async fn list_selections(&self) -> AppResult<Vec<MemberSelection>> {
        let rows = sqlx::query_as::<_, MemberSelectionRow>(
            "SELECT s.*, u.name, u.surname FROM user_selections s \
             JOIN users u ON u.id = s.user_id ORDER BY u.surname, u.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list ledgers"))?;

        Ok(rows
            .into_iter()
            .map(|row| MemberSelection {
                user: UserSummary {
                    id: row.selection.user_id,
                    name: row.name,
                    surname: row.surname,
                },
                selection: row.selection,
            })
            .collect())
    }

    async fn count_occupants(
        &self,
        slot: &SlotSelection,
        exclude: Option<UserId>,
    ) -> AppResult<u32> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_error("Failed to acquire connection"))?;
        count_effective(&mut conn, slot, exclude).await
    }

    async fn commit_selection(
        &self,
        commit: SelectionCommit,
    ) -> AppResult<CommitOutcome<UserSelection>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if let Some(full) = check_guard(&mut tx, &commit).await? {
            debug!(user_id = %commit.next.user_id, slot = %full, "Commit rejected: slot full");
            return Ok(CommitOutcome::SlotFull(full));
        }

        let Some(saved) = write_selection(&mut tx, &commit).await? else {
            return Ok(CommitOutcome::Stale);
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit ledger"))?;
        Ok(CommitOutcome::Committed(saved))
    }

    async fn delete_selection(&self, user_id: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_selections WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete ledger"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn reset_monthly_counters(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_selections SET changes_this_month = 0, last_change = NULL, \
             version = version + 1, updated_at = $1 \
             WHERE changes_this_month <> 0 OR last_change IS NOT NULL",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to reset monthly counters"))?;
        Ok(result.rows_affected())
    }

    async fn clear_temporary_selections(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE user_selections SET temporary_selections = '[]'::jsonb, \
             version = version + 1, updated_at = $1 \
             WHERE jsonb_array_length(temporary_selections) > 0",
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to clear weekly overrides"))?;
        Ok(result.rows_affected())
    }

    async fn find_turn(&self, id: TurnId) -> AppResult<Option<RecoverableTurn>> {
        sqlx::query_as::<_, RecoverableTurn>("SELECT * FROM recoverable_turns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find turn"))
    }

    async fn list_turns_for_user(
        &self,
        user_id: UserId,
        status: Option<TurnStatus>,
    ) -> AppResult<Vec<RecoverableTurn>> {
        let recovered = status.map(|s| s == TurnStatus::Recovered);
        sqlx::query_as::<_, RecoverableTurn>(
            "SELECT * FROM recoverable_turns \
             WHERE user_id = $1 AND ($2::boolean IS NULL OR recovered = $2) \
             ORDER BY cancelled_week, created_at",
        )
        .bind(user_id)
        .bind(recovered)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list turns"))
    }

    async fn save_turn(
        &self,
        commit: SelectionCommit,
        turn: RecoverableTurn,
    ) -> AppResult<CommitOutcome<(UserSelection, RecoverableTurn)>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        if let Some(full) = check_guard(&mut tx, &commit).await? {
            return Ok(CommitOutcome::SlotFull(full));
        }

        let Some(ledger) = write_selection(&mut tx, &commit).await? else {
            return Ok(CommitOutcome::Stale);
        };

        let saved = sqlx::query_as::<_, RecoverableTurn>(
            "INSERT INTO recoverable_turns (id, user_id, original_day, original_hour, \
             cancelled_week, recovered, created_at) \
             VALUES ($1, $2, $3, $4, $5, FALSE, $6) RETURNING *",
        )
        .bind(turn.id)
        .bind(turn.user_id)
        .bind(turn.original_day)
        .bind(&turn.original_hour)
        .bind(turn.cancelled_week)
        .bind(turn.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                "Failed to save turn",
                "This session was already saved for recovery",
            )
        })?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit turn"))?;
        Ok(CommitOutcome::Committed((ledger, saved)))
    }

    async fn redeem_turn(
        &self,
        turn: RecoverableTurn,
        capacity: u32,
    ) -> AppResult<CommitOutcome<RecoverableTurn>> {
        let (Some(slot), Some(date)) = (turn.assigned_slot(), turn.recovery_date) else {
            return Ok(CommitOutcome::Stale);
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        lock_slot(&mut tx, &slot).await?;
        let regulars = count_effective(&mut tx, &slot, Some(turn.user_id)).await?;
        let makeups: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM recoverable_turns \
             WHERE recovered AND assigned_day = $1 AND assigned_hour = $2 \
             AND recovery_date = $3 AND id <> $4",
        )
        .bind(slot.day)
        .bind(&slot.hour)
        .bind(date)
        .bind(turn.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to count redeemed turns"))?;

        let makeups = u32::try_from(makeups).unwrap_or(u32::MAX);
        if regulars.saturating_add(makeups) >= capacity {
            return Ok(CommitOutcome::SlotFull(slot));
        }

        let Some(saved) = sqlx::query_as::<_, RecoverableTurn>(
            "UPDATE recoverable_turns SET recovered = TRUE, recovery_date = $2, \
             assigned_day = $3, assigned_hour = $4 \
             WHERE id = $1 AND recovered = FALSE RETURNING *",
        )
        .bind(turn.id)
        .bind(date)
        .bind(slot.day)
        .bind(&slot.hour)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to redeem turn"))?
        else {
            return Ok(CommitOutcome::Stale);
        };

        tx.commit()
            .await
            .map_err(db_error("Failed to commit redemption"))?;
        Ok(CommitOutcome::Committed(saved))
    }

    async fn revert_turn(&self, id: TurnId) -> AppResult<Option<RecoverableTurn>> {
        sqlx::query_as::<_, RecoverableTurn>(
            "UPDATE recoverable_turns SET recovered = FALSE, recovery_date = NULL, \
             assigned_day = NULL, assigned_hour = NULL WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to revert turn"))
    }

    async fn list_recovered_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RedeemedTurn>> {
        sqlx::query_as::<_, RedeemedTurn>(
            "SELECT t.*, u.name, u.surname FROM recoverable_turns t \
             JOIN users u ON u.id = t.user_id \
             WHERE t.recovered AND t.recovery_date BETWEEN $1 AND $2 \
             ORDER BY t.recovery_date, t.assigned_hour, u.surname",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list redeemed turns"))
    }

    async fn purge_recovered_before(&self, cutoff: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            "DELETE FROM recoverable_turns WHERE recovered AND recovery_date < $1",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to purge redeemed turns"))?;
        Ok(result.rows_affected())
    }
}
