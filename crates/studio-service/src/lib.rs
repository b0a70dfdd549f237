//! # studio-service
//!
//! Business logic for the studio booking backend. Each service orchestrates
//! the store traits, the clock, and credential handling to implement one
//! group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod booking;
pub mod context;
pub mod holiday;
pub mod maintenance;
pub mod notice;
pub mod notify;
pub mod turn;
pub mod user;

#[cfg(test)]
mod testing;

pub use account::{AccountService, AuthSession, RegisterMember};
pub use booking::{
    AdminBookingService, BookingService, MySchedule, Rejection, SelectionOutcome, SelectionResult,
};
pub use context::RequestContext;
pub use holiday::HolidayService;
pub use maintenance::MaintenanceService;
pub use notice::NoticeService;
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier, RecordingNotifier};
pub use turn::TurnService;
pub use user::AdminUserService;
