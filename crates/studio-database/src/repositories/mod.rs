//! PostgreSQL implementations of the store traits.

pub mod holiday;
pub mod notice;
pub mod schedule;
pub mod user;

pub use holiday::HolidayRepository;
pub use notice::NoticeRepository;
pub use schedule::ScheduleRepository;
pub use user::UserRepository;

use studio_core::error::{AppError, ErrorKind};

const UNIQUE_VIOLATION: &str = "23505";

/// Map a sqlx error into a `Database` error, or a `Conflict` carrying
/// `conflict_message` when a unique constraint rejected the write.
pub(crate) fn map_write_error(
    err: sqlx::Error,
    context: &'static str,
    conflict_message: &'static str,
) -> AppError {
    let is_unique = err
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);
    if is_unique {
        AppError::conflict(conflict_message)
    } else {
        AppError::with_source(ErrorKind::Database, context, err)
    }
}

/// Shorthand for `map_err` on reads.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
