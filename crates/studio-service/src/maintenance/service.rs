//! Periodic resets, exposed as explicit operations.
//!
//! Each operation writes final values rather than incrementing, so running
//! it twice leaves the same state as running it once. The worker crate
//! schedules them; admins can also trigger the two resets over HTTP.

use std::sync::Arc;

use chrono::Datelike;
use serde_json::{Value, json};
use tracing::{info, warn};

use studio_core::result::AppResult;
use studio_core::traits::Clock;
use studio_database::{ScheduleStore, UserStore};

use crate::booking::ChangePolicy;
use crate::notify::{Notification, NotificationKind, Notifier};
use crate::turn::TurnService;

#[derive(Debug, Clone)]
pub struct MaintenanceService {
    users: Arc<dyn UserStore>,
    schedule: Arc<dyn ScheduleStore>,
    turns: TurnService,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    policy: ChangePolicy,
}

impl MaintenanceService {
    pub fn new(
        users: Arc<dyn UserStore>,
        schedule: Arc<dyn ScheduleStore>,
        turns: TurnService,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        policy: ChangePolicy,
    ) -> Self {
        Self {
            users,
            schedule,
            turns,
            notifier,
            clock,
            policy,
        }
    }

    /// Start of month: zero every change counter and mark everyone unpaid.
    pub async fn apply_monthly_reset(&self) -> AppResult<Value> {
        let now = self.clock.now();
        let ledgers = self.schedule.reset_monthly_counters(now).await?;
        let payments = self.users.reset_all_payments(now).await?;
        info!(ledgers, payments, "Monthly reset applied");
        Ok(json!({
            "task": "monthly_reset",
            "ran_at": now,
            "ledgers_reset": ledgers,
            "payments_reset": payments,
        }))
    }

    /// End of week: everyone returns to their permanent schedule, and
    /// redemptions from previous months are purged.
    pub async fn apply_weekly_reset(&self) -> AppResult<Value> {
        let now = self.clock.now();
        let overrides = self.schedule.clear_temporary_selections(now).await?;
        let purged = self.turns.purge_stale().await?;
        info!(overrides, purged, "Weekly reset applied");
        Ok(json!({
            "task": "weekly_reset",
            "ran_at": now,
            "overrides_cleared": overrides,
            "turns_purged": purged,
        }))
    }

    pub async fn purge_stale_turns(&self) -> AppResult<Value> {
        let now = self.clock.now();
        let purged = self.turns.purge_stale().await?;
        Ok(json!({
            "task": "purge_stale_turns",
            "ran_at": now,
            "turns_purged": purged,
        }))
    }

    /// Remind unpaid members, but only on the day after the due day.
    pub async fn send_payment_reminders(&self) -> AppResult<Value> {
        let now = self.clock.now();
        let today = self.policy.calendar.local_date(now);
        if today.day() != self.policy.payment_due_day + 1 {
            return Ok(json!({
                "task": "payment_reminders",
                "ran_at": now,
                "skipped": true,
                "sent": 0,
            }));
        }

        let mut sent = 0u64;
        let mut failed = 0u64;
        for member in self.users.list_unpaid_members().await? {
            let notification = Notification {
                kind: NotificationKind::PaymentReminder,
                to: member.email.clone(),
                subject: "Monthly fee reminder".to_string(),
                body: format!(
                    "Hi {}, this month's fee is still pending. Slot changes are locked until it is paid.",
                    member.name
                ),
            };
            match self.notifier.send(notification).await {
                Ok(()) => sent += 1,
                Err(e) => {
                    failed += 1;
                    warn!(user_id = %member.id, error = %e, "Payment reminder failed");
                }
            }
        }
        info!(sent, failed, "Payment reminders sent");
        Ok(json!({
            "task": "payment_reminders",
            "ran_at": now,
            "skipped": false,
            "sent": sent,
            "failed": failed,
        }))
    }
}
