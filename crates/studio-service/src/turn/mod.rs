//! Recoverable-turn lifecycle.

pub mod service;

pub use service::TurnService;
