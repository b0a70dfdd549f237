//! Monthly and weekly resets, turn purging, and payment reminders.

pub mod service;

pub use service::MaintenanceService;
