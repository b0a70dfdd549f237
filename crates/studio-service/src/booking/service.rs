//! Member-facing slot operations.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use studio_core::config::BookingConfig;
use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_core::types::UserId;
use studio_database::{ScheduleStore, SelectionCommit, UserStore};
use studio_entity::schedule::{SlotOccupancy, SlotSelection, UserSelection};
use studio_entity::user::{User, UserSummary};

use super::calendar::StudioCalendar;
use super::engine::{self, ChangeKind, ChangePolicy, Rejection};
use crate::context::RequestContext;

/// A member's schedule as shown to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MySchedule {
    pub weekly_quota: i16,
    pub original_selections: Vec<SlotSelection>,
    pub temporary_selections: Vec<SlotSelection>,
    /// What the member attends this week.
    pub effective_selections: Vec<SlotSelection>,
    pub changes_this_month: i32,
    pub changes_remaining: i32,
    pub paid: bool,
}

/// What a slot submission did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// First assignment; the slots became the permanent schedule.
    Created,
    /// A weekly override that consumed a change.
    Changed,
    /// A single slot dropped for the week, free of charge.
    Removed,
    /// Nothing to do.
    Unchanged,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub outcome: SelectionOutcome,
    pub schedule: MySchedule,
}

/// Slot selection, weekly overrides, and the occupancy view.
#[derive(Debug, Clone)]
pub struct BookingService {
    users: Arc<dyn UserStore>,
    schedule: Arc<dyn ScheduleStore>,
    clock: Arc<dyn Clock>,
    config: BookingConfig,
    policy: ChangePolicy,
}

impl BookingService {
    pub fn new(
        users: Arc<dyn UserStore>,
        schedule: Arc<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
        config: BookingConfig,
    ) -> AppResult<Self> {
        let policy = ChangePolicy {
            max_changes_per_month: config.max_changes_per_month,
            payment_due_day: config.payment_due_day,
            calendar: StudioCalendar::from_config(&config)?,
        };
        Ok(Self {
            users,
            schedule,
            clock,
            config,
            policy,
        })
    }

    pub fn policy(&self) -> &ChangePolicy {
        &self.policy
    }

    pub fn capacity(&self) -> u32 {
        self.config.slot_capacity
    }

    /// The caller's original, temporary, and effective slots.
    pub async fn get_my_slots(&self, ctx: &RequestContext) -> AppResult<MySchedule> {
        let user = self.load_user(ctx.user_id).await?;
        let ledger = self.schedule.find_selection(user.id).await?;
        Ok(self.summarize(&user, ledger.as_ref()))
    }

    /// Submit a full slot set.
    ///
    /// Without a ledger the set becomes the permanent schedule. Otherwise it
    /// becomes this week's override, subject to payment, capacity, and the
    /// monthly change quota.
    pub async fn apply_selection(
        &self,
        ctx: &RequestContext,
        mut requested: Vec<SlotSelection>,
    ) -> AppResult<SelectionResult> {
        let user = self.load_user(ctx.user_id).await?;
        let now = self.clock.now();
        requested.sort();

        let Some(current) = self.schedule.find_selection(user.id).await? else {
            engine::validate_request(&requested, user.weekly_quota, true)?;
            self.check_capacity(&requested, Some(user.id)).await?;

            let commit = SelectionCommit {
                expected_version: None,
                next: UserSelection::first_assignment(user.id, requested.clone(), now),
                capacity_guard: requested,
                capacity: self.capacity(),
            };
            let saved = self.commit(commit).await?;
            info!(user_id = %user.id, slots = saved.original_selections.len(), "Permanent schedule assigned");
            return Ok(self.result(SelectionOutcome::Created, &user, &saved));
        };

        engine::validate_request(&requested, user.weekly_quota, false)?;
        let effective = current.resolve_effective().to_vec();
        let kind = engine::classify(&effective, &requested);
        if kind == ChangeKind::Unchanged {
            debug!(user_id = %user.id, "Submitted slots match the current schedule");
            return Ok(self.result(SelectionOutcome::Unchanged, &user, &current));
        }

        self.policy.check_payment(user.paid, now)?;
        let joined = engine::newly_joined(&effective, &requested);
        self.check_capacity(&joined, Some(user.id)).await?;

        let mut next = current.clone();
        if kind == ChangeKind::Change {
            self.policy.consume_change(&mut next, now)?;
        }
        next.temporary_selections = requested;
        next.updated_at = now;

        let saved = self
            .commit(SelectionCommit {
                expected_version: Some(current.version),
                next,
                capacity_guard: joined,
                capacity: self.capacity(),
            })
            .await?;

        let outcome = match kind {
            ChangeKind::SingleRemoval => SelectionOutcome::Removed,
            _ => SelectionOutcome::Changed,
        };
        info!(
            user_id = %user.id,
            outcome = ?outcome,
            changes_this_month = saved.changes_this_month,
            "Weekly slots updated"
        );
        Ok(self.result(outcome, &user, &saved))
    }

    /// Fail with `SlotFull` on the first candidate already at capacity,
    /// not counting `exclude`.
    pub async fn check_capacity(
        &self,
        candidates: &[SlotSelection],
        exclude: Option<UserId>,
    ) -> AppResult<()> {
        for slot in candidates {
            let occupants = self.schedule.count_occupants(slot, exclude).await?;
            if occupants >= self.capacity() {
                debug!(slot = %slot, occupants, "Slot at capacity");
                return Err(Rejection::SlotFull(slot.clone()).into());
            }
        }
        Ok(())
    }

    /// Drop one slot for the current week only. Never consumes a change.
    pub async fn remove_slot_this_week(
        &self,
        ctx: &RequestContext,
        slot: SlotSelection,
    ) -> AppResult<MySchedule> {
        self.remove_slot_for(ctx.user_id, slot).await
    }

    pub(crate) async fn remove_slot_for(
        &self,
        user_id: UserId,
        slot: SlotSelection,
    ) -> AppResult<MySchedule> {
        let user = self.load_user(user_id).await?;
        let current = self.load_ledger(user_id).await?;

        let effective = current.resolve_effective();
        if !effective.contains(&slot) {
            return Err(AppError::not_found(format!(
                "Slot {slot} is not in this week's schedule"
            )));
        }
        if effective.len() == 1 {
            return Err(AppError::validation(
                "The last remaining slot of the week cannot be cancelled",
            ));
        }

        let mut next = current.clone();
        next.temporary_selections = effective.iter().filter(|s| **s != slot).cloned().collect();
        next.updated_at = self.clock.now();

        let saved = self
            .commit(SelectionCommit {
                expected_version: Some(current.version),
                next,
                capacity_guard: Vec::new(),
                capacity: self.capacity(),
            })
            .await?;
        info!(user_id = %user_id, slot = %slot, "Slot cancelled for this week");
        Ok(self.summarize(&user, Some(&saved)))
    }

    /// Drop this week's override and return to the permanent schedule.
    ///
    /// Sessions already saved for recovery this week stay cancelled.
    pub async fn reset_to_original(&self, ctx: &RequestContext) -> AppResult<MySchedule> {
        let user = self.load_user(ctx.user_id).await?;
        let current = self.load_ledger(user.id).await?;
        let now = self.clock.now();

        let week = self.policy.calendar.week_start(now);
        let saved_this_week: Vec<SlotSelection> = self
            .schedule
            .list_turns_for_user(user.id, None)
            .await?
            .iter()
            .filter(|t| t.cancelled_week == week)
            .map(|t| t.original_slot())
            .collect();
        let restored: Vec<SlotSelection> = current
            .original_selections
            .iter()
            .filter(|s| !saved_this_week.contains(s))
            .cloned()
            .collect();
        if restored.is_empty() {
            return Err(AppError::validation(
                "Every permanent session this week was saved for recovery",
            ));
        }

        let guard = engine::newly_joined(current.resolve_effective(), &restored);
        let mut next = current.clone();
        next.temporary_selections = if restored.len() == current.original_selections.len() {
            Vec::new()
        } else {
            restored
        };
        next.last_change = None;
        next.updated_at = now;

        let saved = self
            .commit(SelectionCommit {
                expected_version: Some(current.version),
                next,
                capacity_guard: guard,
                capacity: self.capacity(),
            })
            .await?;
        info!(user_id = %user.id, "Schedule reset to original");
        Ok(self.summarize(&user, Some(&saved)))
    }

    /// Every occupied slot with its occupants, ordered by day then hour.
    pub async fn list_slots(&self) -> AppResult<Vec<SlotOccupancy>> {
        let mut grouped: BTreeMap<SlotSelection, Vec<UserSummary>> = BTreeMap::new();
        for member in self.schedule.list_selections().await? {
            for slot in member.selection.resolve_effective() {
                grouped
                    .entry(slot.clone())
                    .or_default()
                    .push(member.user.clone());
            }
        }
        Ok(grouped
            .into_iter()
            .map(|(slot, users)| SlotOccupancy { slot, users })
            .collect())
    }

    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    pub(crate) async fn load_user(&self, user_id: UserId) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    pub(crate) async fn load_ledger(&self, user_id: UserId) -> AppResult<UserSelection> {
        self.schedule
            .find_selection(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("No schedule has been assigned yet"))
    }

    pub(crate) async fn commit(&self, commit: SelectionCommit) -> AppResult<UserSelection> {
        let outcome = self.schedule.commit_selection(commit).await?;
        Ok(engine::settle(outcome)?)
    }

    pub(crate) fn summarize(&self, user: &User, ledger: Option<&UserSelection>) -> MySchedule {
        let now = self.clock.now();
        let Some(ledger) = ledger else {
            return MySchedule {
                weekly_quota: user.weekly_quota,
                original_selections: Vec::new(),
                temporary_selections: Vec::new(),
                effective_selections: Vec::new(),
                changes_this_month: 0,
                changes_remaining: self.policy.max_changes_per_month,
                paid: user.paid,
            };
        };
        let used = self.policy.changes_used(ledger, now);
        MySchedule {
            weekly_quota: user.weekly_quota,
            original_selections: ledger.original_selections.clone(),
            temporary_selections: ledger.temporary_selections.clone(),
            effective_selections: ledger.resolve_effective().to_vec(),
            changes_this_month: used,
            changes_remaining: (self.policy.max_changes_per_month - used).max(0),
            paid: user.paid,
        }
    }

    fn result(&self, outcome: SelectionOutcome, user: &User, ledger: &UserSelection) -> SelectionResult {
        SelectionResult {
            outcome,
            schedule: self.summarize(user, Some(ledger)),
        }
    }
}
