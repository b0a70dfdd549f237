//! Administration of member records.

pub mod admin;

pub use admin::AdminUserService;
