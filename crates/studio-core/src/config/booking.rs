//! Booking policy configuration.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Capacity, quota, and calendar settings for the allocation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Maximum number of members occupying one (day, hour) slot.
    #[serde(default = "default_slot_capacity")]
    pub slot_capacity: u32,
    /// Quota-consuming schedule changes allowed per calendar month.
    #[serde(default = "default_max_changes")]
    pub max_changes_per_month: i32,
    /// Last day of the month on which unpaid members may still change slots.
    #[serde(default = "default_payment_due_day")]
    pub payment_due_day: u32,
    /// Studio-local offset from UTC in minutes (Buenos Aires is -180).
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
    /// Smallest weekly quota a member can be registered with.
    #[serde(default = "default_min_quota")]
    pub min_weekly_quota: i16,
    /// Largest weekly quota a member can be registered with.
    #[serde(default = "default_max_quota")]
    pub max_weekly_quota: i16,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slot_capacity: default_slot_capacity(),
            max_changes_per_month: default_max_changes(),
            payment_due_day: default_payment_due_day(),
            utc_offset_minutes: default_utc_offset(),
            min_weekly_quota: default_min_quota(),
            max_weekly_quota: default_max_quota(),
        }
    }
}

impl BookingConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.slot_capacity == 0 {
            return Err(AppError::configuration("booking.slot_capacity must be > 0"));
        }
        if self.max_changes_per_month < 0 {
            return Err(AppError::configuration(
                "booking.max_changes_per_month must be >= 0",
            ));
        }
        if !(1..=28).contains(&self.payment_due_day) {
            return Err(AppError::configuration(
                "booking.payment_due_day must be between 1 and 28",
            ));
        }
        if self.min_weekly_quota < 1 || self.min_weekly_quota > self.max_weekly_quota {
            return Err(AppError::configuration(
                "booking weekly quota bounds are inconsistent",
            ));
        }
        self.studio_offset()?;
        Ok(())
    }

    /// The studio's fixed UTC offset.
    pub fn studio_offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::configuration(format!(
                "booking.utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

fn default_slot_capacity() -> u32 {
    7
}

fn default_max_changes() -> i32 {
    2
}

fn default_payment_due_day() -> u32 {
    10
}

fn default_utc_offset() -> i32 {
    -180
}

fn default_min_quota() -> i16 {
    1
}

fn default_max_quota() -> i16 {
    3
}
