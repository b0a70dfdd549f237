//! Allocation engine: slot selection, weekly overrides, and admin moves.

pub mod admin;
pub mod calendar;
pub mod engine;
pub mod service;

pub use admin::AdminBookingService;
pub use calendar::StudioCalendar;
pub use engine::{ChangeKind, ChangePolicy, Rejection};
pub use service::{BookingService, MySchedule, SelectionOutcome, SelectionResult};
