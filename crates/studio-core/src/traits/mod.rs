//! Seams implemented outside this crate.

pub mod clock;

pub use clock::{Clock, FixedClock, SystemClock};
