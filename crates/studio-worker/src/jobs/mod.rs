//! Built-in maintenance tasks.

pub mod reminder;
pub mod reset;
pub mod turns;

use std::sync::Arc;

use studio_core::error::{AppError, ErrorKind};
use studio_service::MaintenanceService;

use crate::executor::{TaskError, TaskExecutor};

pub use reminder::PaymentReminderTask;
pub use reset::{MonthlyResetTask, WeeklyResetTask};
pub use turns::StaleTurnPurgeTask;

/// An executor with every built-in task registered.
pub fn default_executor(maintenance: MaintenanceService) -> TaskExecutor {
    let mut executor = TaskExecutor::new();
    executor.register(Arc::new(MonthlyResetTask::new(maintenance.clone())));
    executor.register(Arc::new(WeeklyResetTask::new(maintenance.clone())));
    executor.register(Arc::new(StaleTurnPurgeTask::new(maintenance.clone())));
    executor.register(Arc::new(PaymentReminderTask::new(maintenance)));
    executor
}

/// Storage hiccups are worth retrying on the next tick; anything else is not.
pub(crate) fn task_error(err: AppError) -> TaskError {
    match err.kind {
        ErrorKind::Database => TaskError::Transient(err.message),
        _ => TaskError::Internal(err),
    }
}
