//! Scheduled maintenance configuration.
//!
//! Cron expressions use the six-field `sec min hour day month weekday`
//! format and are evaluated in UTC. The defaults correspond to studio-local
//! times at UTC-3.

use serde::{Deserialize, Serialize};

/// Cron settings for the periodic resetter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler is started with the server.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Monthly counter and payment reset (1st of month, 00:00 local).
    #[serde(default = "default_monthly_reset")]
    pub monthly_reset_cron: String,
    /// Weekly temporary-override reset (Saturday, 07:00 local).
    #[serde(default = "default_weekly_reset")]
    pub weekly_reset_cron: String,
    /// Stale redeemed-turn purge (daily, 02:00 local).
    #[serde(default = "default_turn_purge")]
    pub turn_purge_cron: String,
    /// Unpaid-member reminder (11th of month, 09:00 local).
    #[serde(default = "default_payment_reminder")]
    pub payment_reminder_cron: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            monthly_reset_cron: default_monthly_reset(),
            weekly_reset_cron: default_weekly_reset(),
            turn_purge_cron: default_turn_purge(),
            payment_reminder_cron: default_payment_reminder(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_monthly_reset() -> String {
    "0 0 3 1 * *".to_string()
}

fn default_weekly_reset() -> String {
    "0 0 10 * * Sat".to_string()
}

fn default_turn_purge() -> String {
    "0 0 5 * * *".to_string()
}

fn default_payment_reminder() -> String {
    "0 0 12 11 * *".to_string()
}
