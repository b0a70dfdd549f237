//! Store traits the service layer is written against.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-process implementation in [`crate::memory`]. Writes that can
//! raise a slot's occupancy go through [`ScheduleStore::commit_selection`],
//! which re-checks capacity and the ledger version atomically.

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use studio_core::result::AppResult;
use studio_core::types::{PageRequest, PageResponse, TurnId, UserId};
use studio_entity::holiday::Holiday;
use studio_entity::notice::{CreateNotice, InfoNotice};
use studio_entity::schedule::{SlotSelection, UserSelection};
use studio_entity::turn::{RecoverableTurn, RedeemedTurn, TurnStatus};
use studio_entity::user::{CreateUser, UpdateUser, User, UserSummary};

use crate::memory::MemoryStore;
use crate::repositories::{
    HolidayRepository, NoticeRepository, ScheduleRepository, UserRepository,
};

/// A ledger write plus the capacity condition it must satisfy.
#[derive(Debug, Clone)]
pub struct SelectionCommit {
    /// Version the caller read, or `None` when creating the ledger.
    pub expected_version: Option<i64>,
    /// The ledger as it should look after the write.
    pub next: UserSelection,
    /// Slots whose occupancy (excluding this member) must stay below
    /// `capacity` at commit time.
    pub capacity_guard: Vec<SlotSelection>,
    pub capacity: u32,
}

impl SelectionCommit {
    /// Guarded slots deduplicated in a deterministic order, so concurrent
    /// writers always acquire slot locks in the same sequence.
    pub fn ordered_guard(&self) -> Vec<SlotSelection> {
        let mut guard = self.capacity_guard.clone();
        guard.sort();
        guard.dedup();
        guard
    }
}

/// Result of an atomic conditional write.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome<T> {
    Committed(T),
    /// A guarded slot reached capacity.
    SlotFull(SlotSelection),
    /// The row changed since it was read.
    Stale,
}

/// A ledger together with the member it belongs to.
#[derive(Debug, Clone)]
pub struct MemberSelection {
    pub user: UserSummary,
    pub selection: UserSelection,
}

#[async_trait]
pub trait UserStore: Send + Sync + Debug + 'static {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>>;

    /// Case-insensitive lookup.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>>;

    /// Users ordered by surname then name.
    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<User>>;

    /// Members (not admins) whose fee is unpaid.
    async fn list_unpaid_members(&self) -> AppResult<Vec<User>>;

    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, data: CreateUser, now: DateTime<Utc>) -> AppResult<User>;

    /// Apply an admin edit. When `weekly_quota` changes, the member's
    /// ledger is dropped in the same operation.
    async fn update(
        &self,
        id: UserId,
        changes: UpdateUser,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Set the payment flag; `paid_at` follows it.
    async fn set_paid(&self, id: UserId, paid: bool, now: DateTime<Utc>)
    -> AppResult<Option<User>>;

    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Replace the password hash and consume any reset token.
    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Delete the user along with their ledger and turns.
    async fn delete(&self, id: UserId) -> AppResult<bool>;

    /// Mark every user unpaid. Returns the number of rows changed.
    async fn reset_all_payments(&self, now: DateTime<Utc>) -> AppResult<u64>;
}

#[async_trait]
pub trait ScheduleStore: Send + Sync + Debug + 'static {
    async fn find_selection(&self, user_id: UserId) -> AppResult<Option<UserSelection>>;

    /// Every ledger joined with its member.
    async fn list_selections(&self) -> AppResult<Vec<MemberSelection>>;

    /// Members whose effective schedule contains `slot`, optionally
    /// excluding one member.
    async fn count_occupants(
        &self,
        slot: &SlotSelection,
        exclude: Option<UserId>,
    ) -> AppResult<u32>;

    /// Atomically verify capacity and version, then write the ledger.
    async fn commit_selection(
        &self,
        commit: SelectionCommit,
    ) -> AppResult<CommitOutcome<UserSelection>>;

    async fn delete_selection(&self, user_id: UserId) -> AppResult<bool>;

    /// Zero every ledger's change counter and `last_change`.
    async fn reset_monthly_counters(&self, now: DateTime<Utc>) -> AppResult<u64>;

    /// Drop every weekly override.
    async fn clear_temporary_selections(&self, now: DateTime<Utc>) -> AppResult<u64>;

    async fn find_turn(&self, id: TurnId) -> AppResult<Option<RecoverableTurn>>;

    /// A member's turns, oldest first, optionally filtered by status.
    async fn list_turns_for_user(
        &self,
        user_id: UserId,
        status: Option<TurnStatus>,
    ) -> AppResult<Vec<RecoverableTurn>>;

    /// Write the ledger's counter update and insert the turn together.
    /// A turn for the same slot and week already existing is a `Conflict`.
    async fn save_turn(
        &self,
        commit: SelectionCommit,
        turn: RecoverableTurn,
    ) -> AppResult<CommitOutcome<(UserSelection, RecoverableTurn)>>;

    /// Persist a redemption. Occupancy of the assigned slot counts
    /// effective occupants plus turns redeemed into it on the same date.
    /// `Stale` when the turn was redeemed concurrently.
    async fn redeem_turn(
        &self,
        turn: RecoverableTurn,
        capacity: u32,
    ) -> AppResult<CommitOutcome<RecoverableTurn>>;

    /// Clear a redemption. `None` when the turn does not exist.
    async fn revert_turn(&self, id: TurnId) -> AppResult<Option<RecoverableTurn>>;

    /// Recovered turns with `recovery_date` in `[from, to]`.
    async fn list_recovered_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RedeemedTurn>>;

    /// Delete recovered turns whose `recovery_date` is before `cutoff`.
    async fn purge_recovered_before(&self, cutoff: NaiveDate) -> AppResult<u64>;
}

#[async_trait]
pub trait HolidayStore: Send + Sync + Debug + 'static {
    /// Fails with `Conflict` when the date is already marked.
    async fn create(
        &self,
        date: NaiveDate,
        description: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Holiday>;

    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Option<Holiday>>;

    /// All holidays by date.
    async fn list(&self) -> AppResult<Vec<Holiday>>;

    async fn delete_by_date(&self, date: NaiveDate) -> AppResult<bool>;
}

#[async_trait]
pub trait NoticeStore: Send + Sync + Debug + 'static {
    async fn create(&self, data: CreateNotice, now: DateTime<Utc>) -> AppResult<InfoNotice>;

    async fn latest(&self) -> AppResult<Option<InfoNotice>>;

    async fn clear(&self) -> AppResult<u64>;
}

/// The four stores, wired to one backend.
#[derive(Debug, Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub schedule: Arc<dyn ScheduleStore>,
    pub holidays: Arc<dyn HolidayStore>,
    pub notices: Arc<dyn NoticeStore>,
}

impl Stores {
    /// PostgreSQL-backed stores sharing one pool.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            schedule: Arc::new(ScheduleRepository::new(pool.clone())),
            holidays: Arc::new(HolidayRepository::new(pool.clone())),
            notices: Arc::new(NoticeRepository::new(pool)),
        }
    }

    /// Stores backed by a single in-memory state.
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Stores sharing an existing in-memory state.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            schedule: store.clone(),
            holidays: store.clone(),
            notices: store,
        }
    }
}
