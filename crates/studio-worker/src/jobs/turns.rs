//! Purge of redeemed turns from previous months.

use async_trait::async_trait;
use serde_json::Value;

use studio_service::MaintenanceService;

use super::task_error;
use crate::executor::{MaintenanceTask, TaskError};

#[derive(Debug, Clone)]
pub struct StaleTurnPurgeTask {
    maintenance: MaintenanceService,
}

impl StaleTurnPurgeTask {
    pub const NAME: &'static str = "purge_stale_turns";

    pub fn new(maintenance: MaintenanceService) -> Self {
        Self { maintenance }
    }
}

#[async_trait]
impl MaintenanceTask for StaleTurnPurgeTask {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) -> Result<Value, TaskError> {
        self.maintenance
            .purge_stale_turns()
            .await
            .map_err(task_error)
    }
}
