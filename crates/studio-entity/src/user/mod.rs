//! Member and administrator accounts.

pub mod model;
pub mod role;

pub use model::{CreateUser, UpdateUser, User, UserSummary};
pub use role::UserRole;
