//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use studio_core::config::WorkerConfig;
use studio_core::error::AppError;

use crate::executor::{TaskError, TaskExecutor};
use crate::jobs::{MonthlyResetTask, PaymentReminderTask, StaleTurnPurgeTask, WeeklyResetTask};

/// Cron-based scheduler for the maintenance tasks. Schedules are evaluated
/// in UTC.
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
    /// Executor that actually runs the tasks
    executor: Arc<TaskExecutor>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("executor", &self.executor)
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new(executor: Arc<TaskExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
        })
    }

    /// Register the built-in tasks on the schedules from `config`
    pub async fn register_default_tasks(&self, config: &WorkerConfig) -> Result<(), AppError> {
        self.register(MonthlyResetTask::NAME, &config.monthly_reset_cron)
            .await?;
        self.register(WeeklyResetTask::NAME, &config.weekly_reset_cron)
            .await?;
        self.register(StaleTurnPurgeTask::NAME, &config.turn_purge_cron)
            .await?;
        self.register(PaymentReminderTask::NAME, &config.payment_reminder_cron)
            .await?;

        tracing::info!("All scheduled tasks registered");
        Ok(())
    }

    /// Fire the task called `name` on every tick of `cron`.
    pub async fn register(&self, name: &'static str, cron: &str) -> Result<(), AppError> {
        if !self.executor.has_task(name) {
            return Err(AppError::configuration(format!(
                "No maintenance task named '{name}'"
            )));
        }

        let executor = Arc::clone(&self.executor);
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            Box::pin(async move {
                match executor.execute(name).await {
                    Ok(_) => {}
                    Err(TaskError::Transient(e)) => {
                        tracing::warn!("Task '{}' failed, will retry on next tick: {}", name, e);
                    }
                    Err(e) => tracing::error!("Task '{}' failed: {}", name, e),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid cron expression for {name} ('{cron}'): {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {name} schedule: {e}")))?;

        tracing::info!("Registered: {} ({})", name, cron);
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
