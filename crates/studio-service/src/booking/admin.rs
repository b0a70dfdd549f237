//! Administrator overrides of member schedules.
//!
//! These bypass capacity and the monthly change quota.

use tracing::info;

use studio_core::error::AppError;
use studio_core::result::AppResult;
use studio_core::types::UserId;
use studio_database::SelectionCommit;
use studio_entity::schedule::SlotSelection;

use super::service::{BookingService, MySchedule};
use crate::context::RequestContext;

#[derive(Debug, Clone)]
pub struct AdminBookingService {
    booking: BookingService,
}

impl AdminBookingService {
    pub fn new(booking: BookingService) -> Self {
        Self { booking }
    }

    /// Replace one of a member's permanent slots.
    pub async fn move_user(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        current_slot: SlotSelection,
        new_slot: SlotSelection,
    ) -> AppResult<MySchedule> {
        ctx.require_admin()?;
        let user = self.booking.load_user(user_id).await?;
        let current = self.booking.load_ledger(user_id).await?;

        let index = current
            .original_selections
            .iter()
            .position(|s| *s == current_slot)
            .ok_or_else(|| {
                AppError::not_found(format!("Slot {current_slot} is not a permanent slot of this member"))
            })?;

        let clashes = current
            .original_selections
            .iter()
            .enumerate()
            .any(|(i, s)| i != index && s.day == new_slot.day);
        if clashes {
            return Err(AppError::validation(format!(
                "The member already has a permanent slot on {}",
                new_slot.day
            )));
        }

        let mut next = current.clone();
        next.original_selections[index] = new_slot.clone();
        next.original_selections.sort();
        next.updated_at = self.booking.now();

        let saved = self
            .booking
            .commit(SelectionCommit {
                expected_version: Some(current.version),
                next,
                capacity_guard: Vec::new(),
                capacity: self.booking.capacity(),
            })
            .await?;
        info!(
            admin_id = %ctx.user_id,
            user_id = %user_id,
            from = %current_slot,
            to = %new_slot,
            "Admin moved permanent slot"
        );
        Ok(self.booking.summarize(&user, Some(&saved)))
    }

    /// Clear a member's weekly override and give back one change.
    pub async fn reset_to_originals(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
    ) -> AppResult<MySchedule> {
        ctx.require_admin()?;
        let user = self.booking.load_user(user_id).await?;
        let current = self.booking.load_ledger(user_id).await?;

        let mut next = current.clone();
        next.temporary_selections.clear();
        if next.changes_this_month > 0 {
            next.changes_this_month -= 1;
        }
        next.updated_at = self.booking.now();

        let saved = self
            .booking
            .commit(SelectionCommit {
                expected_version: Some(current.version),
                next,
                capacity_guard: Vec::new(),
                capacity: self.booking.capacity(),
            })
            .await?;
        info!(
            admin_id = %ctx.user_id,
            user_id = %user_id,
            changes_this_month = saved.changes_this_month,
            "Admin reset member to original schedule"
        );
        Ok(self.booking.summarize(&user, Some(&saved)))
    }

    /// Cancel one of a member's slots for this week on their behalf.
    pub async fn cancel_user_slot(
        &self,
        ctx: &RequestContext,
        user_id: UserId,
        slot: SlotSelection,
    ) -> AppResult<MySchedule> {
        ctx.require_admin()?;
        info!(admin_id = %ctx.user_id, user_id = %user_id, slot = %slot, "Admin cancelling member slot");
        self.booking.remove_slot_for(user_id, slot).await
    }
}
