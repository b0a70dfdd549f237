//! Task executor: dispatches a named run to its registered task.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing;

use studio_core::error::AppError;

/// A periodic maintenance task.
#[async_trait]
pub trait MaintenanceTask: Send + Sync + std::fmt::Debug {
    /// Stable name used for registration, scheduling, and logs.
    fn name(&self) -> &'static str;

    /// Run once and return a summary of what changed.
    async fn run(&self) -> Result<Value, TaskError>;
}

/// Error from a task run
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// No task is registered under the requested name
    #[error("Unknown maintenance task: '{0}'")]
    Unknown(String),

    /// Transient failure; the next scheduled run may succeed
    #[error("Transient task failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

#[derive(Debug)]
struct Registered {
    task: Arc<dyn MaintenanceTask>,
    running: Arc<Mutex<()>>,
}

/// Runs registered tasks by name. A task whose previous run has not
/// finished is skipped rather than queued.
#[derive(Debug, Default)]
pub struct TaskExecutor {
    tasks: HashMap<&'static str, Registered>,
}

impl TaskExecutor {
    /// Create an empty executor
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task, replacing any task with the same name
    pub fn register(&mut self, task: Arc<dyn MaintenanceTask>) {
        let name = task.name();
        tracing::info!("Registered maintenance task '{}'", name);
        self.tasks.insert(
            name,
            Registered {
                task,
                running: Arc::new(Mutex::new(())),
            },
        );
    }

    /// Run the task called `name`.
    ///
    /// Returns `Ok(None)` when the run was skipped because the previous
    /// one is still in flight.
    pub async fn execute(&self, name: &str) -> Result<Option<Value>, TaskError> {
        let entry = self
            .tasks
            .get(name)
            .ok_or_else(|| TaskError::Unknown(name.to_string()))?;

        let Ok(_guard) = entry.running.try_lock() else {
            tracing::warn!("Skipping '{}': previous run still in progress", name);
            return Ok(None);
        };

        tracing::info!("Running maintenance task '{}'", name);
        let summary = entry.task.run().await?;
        tracing::info!(summary = %summary, "Maintenance task '{}' finished", name);
        Ok(Some(summary))
    }

    /// Whether a task is registered under `name`
    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Names of all registered tasks, sorted
    pub fn registered_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tasks.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
