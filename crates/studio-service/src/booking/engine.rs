//! Allocation rules, free of any I/O.
//!
//! The services load state, ask these functions what is allowed, and hand
//! the resulting ledger to the store for an atomic commit.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use studio_core::error::{AppError, ErrorKind};
use studio_database::CommitOutcome;
use studio_entity::schedule::{SlotSelection, StudioDay, UserSelection};

use super::calendar::StudioCalendar;

/// Why the engine refused a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Slot {0} is full")]
    SlotFull(SlotSelection),
    #[error("The limit of {limit} schedule changes for this month has been reached")]
    ChangeLimitExceeded { limit: i32 },
    #[error("This month's fee must be paid to change slots after day {due_day}")]
    PaymentRequired { due_day: u32 },
    #[error("Only one slot per day can be selected ({0})")]
    DuplicateDay(StudioDay),
    #[error("Expected {expected} slots but received {received}")]
    QuotaMismatch { expected: i16, received: usize },
    #[error("The schedule was modified concurrently; reload and try again")]
    StaleWrite,
}

impl Rejection {
    /// Machine-readable reason code sent to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::SlotFull(_) => "SLOT_FULL",
            Self::ChangeLimitExceeded { .. } => "CHANGE_LIMIT_EXCEEDED",
            Self::PaymentRequired { .. } => "PAYMENT_REQUIRED",
            Self::DuplicateDay(_) => "DUPLICATE_DAY",
            Self::QuotaMismatch { .. } => "QUOTA_MISMATCH",
            Self::StaleWrite => "STALE_WRITE",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            Self::QuotaMismatch { .. } => ErrorKind::Validation,
            _ => ErrorKind::Conflict,
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::new(rejection.kind(), rejection.to_string()).with_reason(rejection.reason())
    }
}

/// Turn a conditional-commit outcome into the committed value or the
/// rejection the caller should see.
pub fn settle<T>(outcome: CommitOutcome<T>) -> Result<T, Rejection> {
    match outcome {
        CommitOutcome::Committed(value) => Ok(value),
        CommitOutcome::SlotFull(slot) => Err(Rejection::SlotFull(slot)),
        CommitOutcome::Stale => Err(Rejection::StaleWrite),
    }
}

/// How a submission relates to the member's current effective schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Same slots as now.
    Unchanged,
    /// Exactly one current slot dropped, nothing added; costs nothing.
    SingleRemoval,
    /// Anything else; consumes a monthly change.
    Change,
}

/// Structural checks on a submitted slot set.
///
/// A first assignment must match the weekly quota exactly; a weekly
/// override may hold fewer slots but never more.
pub fn validate_request(
    requested: &[SlotSelection],
    weekly_quota: i16,
    first_assignment: bool,
) -> Result<(), AppError> {
    if requested.is_empty() {
        return Err(AppError::validation("At least one slot must be selected"));
    }

    let mut days = HashSet::new();
    for slot in requested {
        if !days.insert(slot.day) {
            return Err(Rejection::DuplicateDay(slot.day).into());
        }
    }

    let quota = usize::try_from(weekly_quota).unwrap_or(0);
    let fits = if first_assignment {
        requested.len() == quota
    } else {
        requested.len() <= quota
    };
    if !fits {
        return Err(Rejection::QuotaMismatch {
            expected: weekly_quota,
            received: requested.len(),
        }
        .into());
    }
    Ok(())
}

/// Classify `requested` against the slots currently occupied.
pub fn classify(current: &[SlotSelection], requested: &[SlotSelection]) -> ChangeKind {
    let current: HashSet<&SlotSelection> = current.iter().collect();
    let requested: HashSet<&SlotSelection> = requested.iter().collect();

    if current == requested {
        ChangeKind::Unchanged
    } else if requested.is_subset(&current) && requested.len() + 1 == current.len() {
        ChangeKind::SingleRemoval
    } else {
        ChangeKind::Change
    }
}

/// Slots in `requested` the member does not already occupy. Only these
/// are subject to the capacity check.
pub fn newly_joined(current: &[SlotSelection], requested: &[SlotSelection]) -> Vec<SlotSelection> {
    requested
        .iter()
        .filter(|slot| !current.contains(slot))
        .cloned()
        .collect()
}

/// Monthly change quota and payment deadline.
#[derive(Debug, Clone, Copy)]
pub struct ChangePolicy {
    pub max_changes_per_month: i32,
    pub payment_due_day: u32,
    pub calendar: StudioCalendar,
}

impl ChangePolicy {
    /// Unpaid members may not change slots after the due day.
    pub fn check_payment(&self, paid: bool, now: DateTime<Utc>) -> Result<(), Rejection> {
        if !paid && self.calendar.is_past_due_day(now, self.payment_due_day) {
            return Err(Rejection::PaymentRequired {
                due_day: self.payment_due_day,
            });
        }
        Ok(())
    }

    /// Changes already spent in the month of `now`.
    ///
    /// A null `last_change` keeps the stored count: resetting to the original
    /// schedule clears it mid-month, and only the monthly reset zeroes the
    /// counter.
    pub fn changes_used(&self, ledger: &UserSelection, now: DateTime<Utc>) -> i32 {
        match ledger.last_change {
            Some(last) if !self.calendar.same_month(last, now) => 0,
            _ => ledger.changes_this_month,
        }
    }

    /// Spend one change credit on `ledger`, or refuse when the month's
    /// quota is exhausted.
    pub fn consume_change(
        &self,
        ledger: &mut UserSelection,
        now: DateTime<Utc>,
    ) -> Result<(), Rejection> {
        let used = self.changes_used(ledger, now);
        if used >= self.max_changes_per_month {
            return Err(Rejection::ChangeLimitExceeded {
                limit: self.max_changes_per_month,
            });
        }
        ledger.changes_this_month = used + 1;
        ledger.last_change = Some(now);
        Ok(())
    }
}
