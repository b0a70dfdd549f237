//! Weekly class schedule: days, slots, and per-member selection ledgers.

pub mod day;
pub mod selection;
pub mod slot;

pub use day::StudioDay;
pub use selection::{SlotOccupancy, UserSelection};
pub use slot::SlotSelection;
