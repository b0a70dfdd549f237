//! Recoverable turns: saving a cancelled session as a make-up credit,
//! redeeming it into a concrete date, and reverting or purging redemptions.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::types::TurnId;
use studio_database::{HolidayStore, ScheduleStore, SelectionCommit};
use studio_entity::schedule::SlotSelection;
use studio_entity::turn::{RecoverableTurn, RedeemedTurn, TurnStatus};

use crate::booking::BookingService;
use crate::booking::engine;
use crate::context::RequestContext;

#[derive(Debug, Clone)]
pub struct TurnService {
    booking: BookingService,
    schedule: Arc<dyn ScheduleStore>,
    holidays: Arc<dyn HolidayStore>,
}

impl TurnService {
    pub fn new(
        booking: BookingService,
        schedule: Arc<dyn ScheduleStore>,
        holidays: Arc<dyn HolidayStore>,
    ) -> Self {
        Self {
            booking,
            schedule,
            holidays,
        }
    }

    /// Cancel one of this week's sessions and keep it as a make-up credit.
    ///
    /// Costs one monthly change. The slot leaves this week's schedule in the
    /// same write that records the credit.
    pub async fn save(&self, ctx: &RequestContext, slot: SlotSelection) -> AppResult<RecoverableTurn> {
        let user = self.booking.load_user(ctx.user_id).await?;
        let ledger = self.booking.load_ledger(user.id).await?;
        let effective = ledger.resolve_effective();
        if !effective.contains(&slot) {
            return Err(AppError::validation(format!(
                "Slot {slot} is not in this week's schedule"
            )));
        }
        if effective.len() == 1 {
            return Err(AppError::validation(
                "The last remaining slot of the week cannot be saved for recovery",
            ));
        }

        let now = self.booking.now();
        let policy = self.booking.policy();
        policy.check_payment(user.paid, now)?;

        let mut next = ledger.clone();
        policy.consume_change(&mut next, now)?;
        next.temporary_selections = effective.iter().filter(|s| **s != slot).cloned().collect();
        next.updated_at = now;

        let week = policy.calendar.week_start(now);
        let turn = RecoverableTurn::pending(user.id, &slot, week, now);
        let commit = SelectionCommit {
            expected_version: Some(ledger.version),
            next,
            capacity_guard: Vec::new(),
            capacity: self.booking.capacity(),
        };

        let (saved, turn) = engine::settle(self.schedule.save_turn(commit, turn).await?)?;
        info!(
            user_id = %user.id,
            turn_id = %turn.id,
            slot = %slot,
            changes_this_month = saved.changes_this_month,
            "Session saved for recovery"
        );
        Ok(turn)
    }

    /// The caller's pending credits.
    pub async fn list_pending(&self, ctx: &RequestContext) -> AppResult<Vec<RecoverableTurn>> {
        self.schedule
            .list_turns_for_user(ctx.user_id, Some(TurnStatus::Pending))
            .await
    }

    /// Redeem a credit into `slot` on its next occurrence, or the one after
    /// when `next_week` is set.
    pub async fn redeem(
        &self,
        ctx: &RequestContext,
        turn_id: TurnId,
        slot: SlotSelection,
        next_week: bool,
    ) -> AppResult<RecoverableTurn> {
        let mut turn = self
            .schedule
            .find_turn(turn_id)
            .await?
            .filter(|t| t.user_id == ctx.user_id)
            .ok_or_else(|| AppError::not_found("Recoverable turn not found"))?;
        if turn.recovered {
            return Err(AppError::conflict("This turn has already been redeemed"));
        }

        let now = self.booking.now();
        let date = self
            .booking
            .policy()
            .calendar
            .redemption_date(now, slot.day, next_week);

        if let Some(holiday) = self.holidays.find_by_date(date).await? {
            return Err(AppError::conflict(format!(
                "{date} is a holiday ({})",
                holiday.description
            )));
        }

        let already_attending = self
            .schedule
            .find_selection(ctx.user_id)
            .await?
            .is_some_and(|ledger| ledger.occupies(&slot));
        if already_attending {
            return Err(AppError::validation(format!(
                "Slot {slot} is already part of your schedule"
            )));
        }

        turn.redeem(&slot, date);
        let outcome = self.schedule.redeem_turn(turn, self.booking.capacity()).await?;
        let redeemed = engine::settle(outcome)?;
        info!(
            user_id = %ctx.user_id,
            turn_id = %redeemed.id,
            slot = %slot,
            date = %date,
            "Recoverable turn redeemed"
        );
        Ok(redeemed)
    }

    /// Undo one of the caller's redemptions. The spent change is not
    /// returned.
    pub async fn revert(&self, ctx: &RequestContext, turn_id: TurnId) -> AppResult<RecoverableTurn> {
        let turn = self
            .schedule
            .find_turn(turn_id)
            .await?
            .filter(|t| t.user_id == ctx.user_id || ctx.is_admin())
            .ok_or_else(|| AppError::not_found("Recoverable turn not found"))?;
        self.revert_turn(ctx, turn).await
    }

    /// Remove any member's redemption.
    pub async fn admin_revert(
        &self,
        ctx: &RequestContext,
        turn_id: TurnId,
    ) -> AppResult<RecoverableTurn> {
        ctx.require_admin()?;
        let turn = self
            .schedule
            .find_turn(turn_id)
            .await?
            .ok_or_else(|| AppError::not_found("Recoverable turn not found"))?;
        self.revert_turn(ctx, turn).await
    }

    async fn revert_turn(
        &self,
        ctx: &RequestContext,
        turn: RecoverableTurn,
    ) -> AppResult<RecoverableTurn> {
        if !turn.recovered {
            return Err(AppError::validation("This turn has not been redeemed"));
        }
        let reverted = self
            .schedule
            .revert_turn(turn.id)
            .await?
            .ok_or_else(|| AppError::not_found("Recoverable turn not found"))?;
        info!(
            actor_id = %ctx.user_id,
            user_id = %reverted.user_id,
            turn_id = %reverted.id,
            "Redemption reverted"
        );
        Ok(reverted)
    }

    /// Redemptions dated within `[from, to]`, with the member's name.
    pub async fn list_redeemed_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<RedeemedTurn>> {
        if from > to {
            return Err(AppError::validation("'from' must not be after 'to'"));
        }
        self.schedule.list_recovered_between(from, to).await
    }

    /// Admin trigger for [`Self::purge_stale`].
    pub async fn purge_redeemed(&self, ctx: &RequestContext) -> AppResult<u64> {
        ctx.require_admin()?;
        self.purge_stale().await
    }

    /// Delete redemptions dated before the first day of the current month.
    pub async fn purge_stale(&self) -> AppResult<u64> {
        let cutoff = self.booking.policy().calendar.month_start(self.booking.now());
        let purged = self.schedule.purge_recovered_before(cutoff).await?;
        info!(cutoff = %cutoff, purged, "Purged old redeemed turns");
        Ok(purged)
    }
}
