//! Recoverable turns: make-up credits issued for cancelled sessions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::{TurnId, UserId};

use crate::schedule::{SlotSelection, StudioDay};

/// Lifecycle state derived from the `recovered` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnStatus {
    /// Cancelled and waiting to be redeemed.
    Pending,
    /// Redeemed into a concrete make-up session.
    Recovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RecoverableTurn {
    pub id: TurnId,
    pub user_id: UserId,
    pub original_day: StudioDay,
    pub original_hour: String,
    /// Monday of the week in which the session was cancelled.
    pub cancelled_week: NaiveDate,
    pub recovered: bool,
    /// Calendar date of the make-up session.
    pub recovery_date: Option<NaiveDate>,
    pub assigned_day: Option<StudioDay>,
    pub assigned_hour: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RecoverableTurn {
    /// A new pending turn for `slot` cancelled during `cancelled_week`.
    pub fn pending(
        user_id: UserId,
        slot: &SlotSelection,
        cancelled_week: NaiveDate,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TurnId::new(),
            user_id,
            original_day: slot.day,
            original_hour: slot.hour.clone(),
            cancelled_week,
            recovered: false,
            recovery_date: None,
            assigned_day: None,
            assigned_hour: None,
            created_at: now,
        }
    }

    pub fn status(&self) -> TurnStatus {
        if self.recovered {
            TurnStatus::Recovered
        } else {
            TurnStatus::Pending
        }
    }

    /// The cancelled slot this credit came from.
    pub fn original_slot(&self) -> SlotSelection {
        SlotSelection {
            day: self.original_day,
            hour: self.original_hour.clone(),
        }
    }

    /// The make-up slot, once redeemed.
    pub fn assigned_slot(&self) -> Option<SlotSelection> {
        match (self.assigned_day, &self.assigned_hour) {
            (Some(day), Some(hour)) => Some(SlotSelection {
                day,
                hour: hour.clone(),
            }),
            _ => None,
        }
    }

    /// Mark as redeemed into `slot` on `date`.
    pub fn redeem(&mut self, slot: &SlotSelection, date: NaiveDate) {
        self.recovered = true;
        self.recovery_date = Some(date);
        self.assigned_day = Some(slot.day);
        self.assigned_hour = Some(slot.hour.clone());
    }

    /// Undo a redemption, making the credit available again.
    pub fn revert(&mut self) {
        self.recovered = false;
        self.recovery_date = None;
        self.assigned_day = None;
        self.assigned_hour = None;
    }
}

/// A redeemed turn together with the member who redeemed it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RedeemedTurn {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub turn: RecoverableTurn,
    pub name: String,
    pub surname: String,
}
