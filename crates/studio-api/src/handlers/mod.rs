//! Route handlers organized by domain.

pub mod admin;
pub mod auth;
pub mod health;
pub mod holiday;
pub mod notice;
pub mod schedule;
pub mod turn;
