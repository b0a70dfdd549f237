//! # studio-database
//!
//! Persistence for the studio booking backend: the store traits services
//! are written against, their PostgreSQL implementations, an in-memory
//! implementation, and pool and migration management.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    CommitOutcome, HolidayStore, MemberSelection, NoticeStore, ScheduleStore, SelectionCommit,
    Stores, UserStore,
};
