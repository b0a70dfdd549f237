//! Monthly and weekly resets.

use async_trait::async_trait;
use serde_json::Value;

use studio_service::MaintenanceService;

use super::task_error;
use crate::executor::{MaintenanceTask, TaskError};

/// Zeroes change counters and payment flags at the start of each month.
#[derive(Debug, Clone)]
pub struct MonthlyResetTask {
    maintenance: MaintenanceService,
}

impl MonthlyResetTask {
    pub const NAME: &'static str = "monthly_reset";

    pub fn new(maintenance: MaintenanceService) -> Self {
        Self { maintenance }
    }
}

#[async_trait]
impl MaintenanceTask for MonthlyResetTask {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) -> Result<Value, TaskError> {
        self.maintenance
            .apply_monthly_reset()
            .await
            .map_err(task_error)
    }
}

/// Returns every member to their permanent schedule at the end of the week.
#[derive(Debug, Clone)]
pub struct WeeklyResetTask {
    maintenance: MaintenanceService,
}

impl WeeklyResetTask {
    pub const NAME: &'static str = "weekly_reset";

    pub fn new(maintenance: MaintenanceService) -> Self {
        Self { maintenance }
    }
}

#[async_trait]
impl MaintenanceTask for WeeklyResetTask {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) -> Result<Value, TaskError> {
        self.maintenance
            .apply_weekly_reset()
            .await
            .map_err(task_error)
    }
}
