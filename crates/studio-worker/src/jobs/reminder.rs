//! Reminder for members who have not paid this month's fee.

use async_trait::async_trait;
use serde_json::Value;

use studio_service::MaintenanceService;

use super::task_error;
use crate::executor::{MaintenanceTask, TaskError};

/// Notifies unpaid members. The service itself decides whether today is
/// the reminder day, so an extra trigger is harmless.
#[derive(Debug, Clone)]
pub struct PaymentReminderTask {
    maintenance: MaintenanceService,
}

impl PaymentReminderTask {
    pub const NAME: &'static str = "payment_reminders";

    pub fn new(maintenance: MaintenanceService) -> Self {
        Self { maintenance }
    }
}

#[async_trait]
impl MaintenanceTask for PaymentReminderTask {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn run(&self) -> Result<Value, TaskError> {
        self.maintenance
            .send_payment_reminders()
            .await
            .map_err(task_error)
    }
}
