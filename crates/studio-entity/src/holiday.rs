//! Blackout dates on which no classes are held.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use studio_core::types::HolidayId;

/// Description used when an admin marks a holiday without one.
pub const DEFAULT_HOLIDAY_DESCRIPTION: &str = "Holiday";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Holiday {
    pub id: HolidayId,
    /// Unique calendar date in studio-local time.
    pub date: NaiveDate,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
