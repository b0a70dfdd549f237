//! # studio-entity
//!
//! Domain entity models for the studio booking backend. Every struct in
//! this crate represents a database table row or a domain value object.
//! All entities derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and
//! table rows additionally derive `sqlx::FromRow`.

pub mod holiday;
pub mod notice;
pub mod schedule;
pub mod turn;
pub mod user;
