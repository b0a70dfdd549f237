//! Scheduled maintenance for the studio booking backend.
//!
//! This crate provides:
//! - A task executor that runs named maintenance tasks and skips a run
//!   while the previous one is still in flight
//! - A cron scheduler that fires those tasks on the configured schedules
//! - Task implementations wrapping the maintenance service

pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use executor::{MaintenanceTask, TaskError, TaskExecutor};
pub use scheduler::CronScheduler;
