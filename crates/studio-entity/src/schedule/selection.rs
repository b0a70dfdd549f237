//! Per-member slot ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::UserId;

use super::slot::SlotSelection;
use crate::user::UserSummary;

/// A member's permanent schedule plus this week's override.
///
/// `original_selections` is the permanent weekly schedule. A non-empty
/// `temporary_selections` replaces it in full for the current week only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserSelection {
    pub user_id: UserId,
    #[sqlx(json)]
    pub original_selections: Vec<SlotSelection>,
    #[sqlx(json)]
    pub temporary_selections: Vec<SlotSelection>,
    /// Quota-consuming changes made during the month of `last_change`.
    pub changes_this_month: i32,
    pub last_change: Option<DateTime<Utc>>,
    /// Bumped on every write; guards against lost updates.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserSelection {
    /// A fresh ledger holding a first assignment.
    pub fn first_assignment(
        user_id: UserId,
        original_selections: Vec<SlotSelection>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            original_selections,
            temporary_selections: Vec::new(),
            changes_this_month: 0,
            last_change: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// The slots the member actually occupies this week.
    pub fn resolve_effective(&self) -> &[SlotSelection] {
        if self.temporary_selections.is_empty() {
            &self.original_selections
        } else {
            &self.temporary_selections
        }
    }

    /// Whether a weekly override is active.
    pub fn has_override(&self) -> bool {
        !self.temporary_selections.is_empty()
    }

    pub fn occupies(&self, slot: &SlotSelection) -> bool {
        self.resolve_effective().contains(slot)
    }
}

/// Who occupies one slot this week.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotOccupancy {
    #[serde(flatten)]
    pub slot: SlotSelection,
    pub users: Vec<UserSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::StudioDay;

    fn slot(day: StudioDay, hour: &str) -> SlotSelection {
        SlotSelection::new(day, hour).unwrap()
    }

    #[test]
    fn test_resolve_effective_prefers_override() {
        let mut ledger = UserSelection::first_assignment(
            UserId::new(),
            vec![slot(StudioDay::Monday, "08:00"), slot(StudioDay::Wednesday, "18:00")],
            Utc::now(),
        );
        assert_eq!(ledger.resolve_effective(), ledger.original_selections.as_slice());
        assert!(!ledger.has_override());

        ledger.temporary_selections = vec![slot(StudioDay::Friday, "10:00")];
        assert_eq!(ledger.resolve_effective(), &[slot(StudioDay::Friday, "10:00")]);
        assert!(ledger.occupies(&slot(StudioDay::Friday, "10:00")));
        assert!(!ledger.occupies(&slot(StudioDay::Monday, "08:00")));
    }

    #[test]
    fn test_resolve_effective_is_stable() {
        let ledger = UserSelection::first_assignment(
            UserId::new(),
            vec![slot(StudioDay::Tuesday, "07:00")],
            Utc::now(),
        );
        assert_eq!(ledger.resolve_effective(), ledger.resolve_effective());
    }

    #[test]
    fn test_occupancy_flattens_slot() {
        let occupancy = SlotOccupancy {
            slot: slot(StudioDay::Monday, "08:00"),
            users: vec![],
        };
        let json = serde_json::to_value(&occupancy).unwrap();
        assert_eq!(json["day"], "monday");
        assert_eq!(json["hour"], "08:00");
    }
}
