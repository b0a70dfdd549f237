//! Member accounts: registration, sign-in, and password recovery.

pub mod profile;
pub mod service;

pub use service::{AccountService, AuthSession, RegisterMember};
