//! Process-local implementation of every store trait.
//!
//! All state sits behind one `tokio::sync::Mutex`, so each operation
//! (including the conditional commits) is atomic with respect to the
//! others. Used by the `memory` backend and by tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;

use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::types::{HolidayId, NoticeId, PageRequest, PageResponse, TurnId, UserId};
use studio_entity::holiday::Holiday;
use studio_entity::notice::{CreateNotice, InfoNotice};
use studio_entity::schedule::{SlotSelection, UserSelection};
use studio_entity::turn::{RecoverableTurn, RedeemedTurn, TurnStatus};
use studio_entity::user::{CreateUser, UpdateUser, User, UserSummary};

use crate::store::{
    CommitOutcome, HolidayStore, MemberSelection, NoticeStore, ScheduleStore, SelectionCommit,
    UserStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<UserId, User>,
    selections: HashMap<UserId, UserSelection>,
    turns: HashMap<TurnId, RecoverableTurn>,
    holidays: BTreeMap<NaiveDate, Holiday>,
    notices: Vec<InfoNotice>,
}

impl MemoryState {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }

    fn count_effective(&self, slot: &SlotSelection, exclude: Option<UserId>) -> u32 {
        let count = self
            .selections
            .values()
            .filter(|s| Some(s.user_id) != exclude && s.occupies(slot))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn first_full_slot(&self, commit: &SelectionCommit) -> Option<SlotSelection> {
        commit.ordered_guard().into_iter().find(|slot| {
            self.count_effective(slot, Some(commit.next.user_id)) >= commit.capacity
        })
    }

    fn write_selection(&mut self, commit: &SelectionCommit) -> Option<UserSelection> {
        let user_id = commit.next.user_id;
        let current_version = self.selections.get(&user_id).map(|s| s.version);
        let mut next = commit.next.clone();
        match (commit.expected_version, current_version) {
            (None, None) => next.version = 0,
            (Some(expected), Some(current)) if expected == current => {
                next.version = current + 1;
            }
            _ => return None,
        }
        self.selections.insert(user_id, next.clone());
        Some(next)
    }

    fn summary(&self, user_id: UserId) -> Option<UserSummary> {
        self.users.get(&user_id).map(UserSummary::from)
    }
}

/// In-memory store. Cheap to create; state is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.state.lock().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .values()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn list(&self, page: PageRequest) -> AppResult<PageResponse<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| {
            (&a.surname, &a.name, a.id).cmp(&(&b.surname, &b.name, b.id))
        });
        let total = users.len() as u64;
        let items = users
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit()).unwrap_or(usize::MAX))
            .collect();
        Ok(PageResponse::new(items, page, total))
    }

    async fn list_unpaid_members(&self) -> AppResult<Vec<User>> {
        let state = self.state.lock().await;
        let mut users: Vec<User> = state
            .users
            .values()
            .filter(|u| !u.is_admin() && !u.paid)
            .cloned()
            .collect();
        users.sort_by(|a, b| (&a.surname, &a.name).cmp(&(&b.surname, &b.name)));
        Ok(users)
    }

    async fn create(&self, data: CreateUser, now: DateTime<Utc>) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.email_taken(&data.email, None) {
            return Err(AppError::conflict("Email is already registered"));
        }
        let user = User {
            id: UserId::new(),
            name: data.name,
            surname: data.surname,
            email: data.email,
            phone: data.phone,
            weekly_quota: data.weekly_quota,
            password_hash: data.password_hash,
            paid: false,
            paid_at: None,
            role: data.role,
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(
        &self,
        id: UserId,
        changes: UpdateUser,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        let email_clash = changes
            .email
            .as_deref()
            .is_some_and(|email| state.email_taken(email, Some(id)));
        if email_clash {
            return Err(AppError::conflict("Email is already registered"));
        }
        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        let quota_changed = user.apply_update(changes, now);
        let updated = user.clone();
        if quota_changed {
            state.selections.remove(&id);
        }
        Ok(Some(updated))
    }

    async fn set_paid(
        &self,
        id: UserId,
        paid: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut state = self.state.lock().await;
        Ok(state.users.get_mut(&id).map(|user| {
            user.set_paid(paid, now);
            user.clone()
        }))
    }

    async fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&id) {
            user.reset_token_hash = Some(token_hash.to_string());
            user.reset_token_expires_at = Some(expires_at);
        }
        Ok(())
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
            user.reset_token_hash = None;
            user.reset_token_expires_at = None;
            user.updated_at = now;
        }
        Ok(())
    }

    async fn delete(&self, id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        if state.users.remove(&id).is_none() {
            return Ok(false);
        }
        state.selections.remove(&id);
        state.turns.retain(|_, turn| turn.user_id != id);
        Ok(true)
    }

    async fn reset_all_payments(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for user in state.users.values_mut().filter(|u| u.paid) {
            user.set_paid(false, now);
            changed += 1;
        }
        Ok(changed)
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn find_selection(&self, user_id: UserId) -> AppResult<Option<UserSelection>> {
        Ok(self.state.lock().await.selections.get(&user_id).cloned())
    }

    async fn list_selections(&self) -> AppResult<Vec<MemberSelection>> {
        let state = self.state.lock().await;
        let mut rows: Vec<MemberSelection> = state
            .selections
            .values()
            .filter_map(|selection| {
                state.summary(selection.user_id).map(|user| MemberSelection {
                    user,
                    selection: selection.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.user.surname, &a.user.name).cmp(&(&b.user.surname, &b.user.name))
        });
        Ok(rows)
    }

    async fn count_occupants(
        &self,
        slot: &SlotSelection,
        exclude: Option<UserId>,
    ) -> AppResult<u32> {
        Ok(self.state.lock().await.count_effective(slot, exclude))
    }

    async fn commit_selection(
        &self,
        commit: SelectionCommit,
    ) -> AppResult<CommitOutcome<UserSelection>> {
        let mut state = self.state.lock().await;
        if let Some(full) = state.first_full_slot(&commit) {
            return Ok(CommitOutcome::SlotFull(full));
        }
        Ok(match state.write_selection(&commit) {
            Some(saved) => CommitOutcome::Committed(saved),
            None => CommitOutcome::Stale,
        })
    }

    async fn delete_selection(&self, user_id: UserId) -> AppResult<bool> {
        Ok(self.state.lock().await.selections.remove(&user_id).is_some())
    }

    async fn reset_monthly_counters(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for ledger in state
            .selections
            .values_mut()
            .filter(|s| s.changes_this_month != 0 || s.last_change.is_some())
        {
            ledger.changes_this_month = 0;
            ledger.last_change = None;
            ledger.version += 1;
            ledger.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn clear_temporary_selections(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut changed = 0;
        for ledger in state.selections.values_mut().filter(|s| s.has_override()) {
            ledger.temporary_selections.clear();
            ledger.version += 1;
            ledger.updated_at = now;
            changed += 1;
        }
        Ok(changed)
    }

    async fn find_turn(&self, id: TurnId) -> AppResult<Option<RecoverableTurn>> {
        Ok(self.state.lock().await.turns.get(&id).cloned())
    }

    async fn list_turns_for_user(
        &self,
        user_id: UserId,
        status: Option<TurnStatus>,
    ) -> AppResult<Vec<RecoverableTurn>> {
        let state = self.state.lock().await;
        let mut turns: Vec<RecoverableTurn> = state
            .turns
            .values()
            .filter(|t| t.user_id == user_id && status.is_none_or(|s| t.status() == s))
            .cloned()
            .collect();
        turns.sort_by_key(|t| (t.cancelled_week, t.created_at));
        Ok(turns)
    }

    async fn save_turn(
        &self,
        commit: SelectionCommit,
        turn: RecoverableTurn,
    ) -> AppResult<CommitOutcome<(UserSelection, RecoverableTurn)>> {
        let mut state = self.state.lock().await;
        let duplicate = state.turns.values().any(|t| {
            t.user_id == turn.user_id
                && t.original_day == turn.original_day
                && t.original_hour == turn.original_hour
                && t.cancelled_week == turn.cancelled_week
        });
        if duplicate {
            return Err(AppError::conflict(
                "This session was already saved for recovery",
            ));
        }
        if let Some(full) = state.first_full_slot(&commit) {
            return Ok(CommitOutcome::SlotFull(full));
        }
        let Some(ledger) = state.write_selection(&commit) else {
            return Ok(CommitOutcome::Stale);
        };
        state.turns.insert(turn.id, turn.clone());
        Ok(CommitOutcome::Committed((ledger, turn)))
    }

    async fn redeem_turn(
        &self,
        turn: RecoverableTurn,
        capacity: u32,
    ) -> AppResult<CommitOutcome<RecoverableTurn>> {
        let (Some(slot), Some(date)) = (turn.assigned_slot(), turn.recovery_date) else {
            return Ok(CommitOutcome::Stale);
        };
        let mut state = self.state.lock().await;

        let regulars = state.count_effective(&slot, Some(turn.user_id));
        let makeups = state
            .turns
            .values()
            .filter(|t| {
                t.id != turn.id
                    && t.recovered
                    && t.recovery_date == Some(date)
                    && t.assigned_slot().as_ref() == Some(&slot)
            })
            .count();
        let makeups = u32::try_from(makeups).unwrap_or(u32::MAX);
        if regulars.saturating_add(makeups) >= capacity {
            return Ok(CommitOutcome::SlotFull(slot));
        }

        match state.turns.get_mut(&turn.id) {
            Some(stored) if !stored.recovered => {
                stored.redeem(&slot, date);
                Ok(CommitOutcome::Committed(stored.clone()))
            }
            _ => Ok(CommitOutcome::Stale),
        }
    }

    async fn revert_turn(&self, id: TurnId) -> AppResult<Option<RecoverableTurn>> {
        let mut state = self.state.lock().await;
        Ok(state.turns.get_mut(&id).map(|turn| {
            turn.revert();
            turn.clone()
        }))
    }

    async fn list_recovered_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RedeemedTurn>> {
        let state = self.state.lock().await;
        let mut rows: Vec<RedeemedTurn> = state
            .turns
            .values()
            .filter(|t| t.recovered && t.recovery_date.is_some_and(|d| d >= from && d <= to))
            .filter_map(|t| {
                state.users.get(&t.user_id).map(|u| RedeemedTurn {
                    turn: t.clone(),
                    name: u.name.clone(),
                    surname: u.surname.clone(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.turn.recovery_date, &a.turn.assigned_hour, &a.surname).cmp(&(
                b.turn.recovery_date,
                &b.turn.assigned_hour,
                &b.surname,
            ))
        });
        Ok(rows)
    }

    async fn purge_recovered_before(&self, cutoff: NaiveDate) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.turns.len();
        state
            .turns
            .retain(|_, t| !(t.recovered && t.recovery_date.is_some_and(|d| d < cutoff)));
        Ok((before - state.turns.len()) as u64)
    }
}

#[async_trait]
impl HolidayStore for MemoryStore {
    async fn create(
        &self,
        date: NaiveDate,
        description: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Holiday> {
        let mut state = self.state.lock().await;
        if state.holidays.contains_key(&date) {
            return Err(AppError::conflict("Date is already a holiday"));
        }
        let holiday = Holiday {
            id: HolidayId::new(),
            date,
            description: description.to_string(),
            created_at: now,
        };
        state.holidays.insert(date, holiday.clone());
        Ok(holiday)
    }

    async fn find_by_date(&self, date: NaiveDate) -> AppResult<Option<Holiday>> {
        Ok(self.state.lock().await.holidays.get(&date).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Holiday>> {
        Ok(self.state.lock().await.holidays.values().cloned().collect())
    }

    async fn delete_by_date(&self, date: NaiveDate) -> AppResult<bool> {
        Ok(self.state.lock().await.holidays.remove(&date).is_some())
    }
}

#[async_trait]
impl NoticeStore for MemoryStore {
    async fn create(&self, data: CreateNotice, now: DateTime<Utc>) -> AppResult<InfoNotice> {
        let notice = InfoNotice {
            id: NoticeId::new(),
            title: data.title,
            description: data.description,
            link: data.link,
            created_at: now,
        };
        self.state.lock().await.notices.push(notice.clone());
        Ok(notice)
    }

    async fn latest(&self) -> AppResult<Option<InfoNotice>> {
        let state = self.state.lock().await;
        Ok(state.notices.iter().max_by_key(|n| n.created_at).cloned())
    }

    async fn clear(&self) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let removed = state.notices.len() as u64;
        state.notices.clear();
        Ok(removed)
    }
}
