//! Admin-only handlers. Every handler takes an `AdminUser`, so non-admins
//! are turned away before the body is read.

pub mod maintenance;
pub mod notices;
pub mod schedule;
pub mod turns;
pub mod users;
