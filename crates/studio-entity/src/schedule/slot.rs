//! A recurring weekly class slot.

use std::fmt;

use serde::{Deserialize, Serialize};
use studio_core::AppError;

use super::day::StudioDay;

/// One (day, hour) pair. Hours are always zero-padded 24h `HH:MM`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSlot")]
pub struct SlotSelection {
    pub day: StudioDay,
    pub hour: String,
}

#[derive(Deserialize)]
struct RawSlot {
    day: StudioDay,
    hour: String,
}

impl TryFrom<RawSlot> for SlotSelection {
    type Error = AppError;

    fn try_from(raw: RawSlot) -> Result<Self, Self::Error> {
        Self::new(raw.day, &raw.hour)
    }
}

impl SlotSelection {
    /// Build a slot, normalizing `hour` (`"8:00"` becomes `"08:00"`).
    pub fn new(day: StudioDay, hour: &str) -> Result<Self, AppError> {
        Ok(Self {
            day,
            hour: normalize_hour(hour)?,
        })
    }

    /// Key used for advisory locks and grouping.
    pub fn key(&self) -> String {
        format!("{}-{}", self.day, self.hour)
    }
}

impl fmt::Display for SlotSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.hour)
    }
}

/// Normalize an `H:MM`/`HH:MM` hour into `HH:MM`.
pub fn normalize_hour(hour: &str) -> Result<String, AppError> {
    let invalid = || AppError::validation(format!("Invalid hour '{hour}', expected HH:MM"));

    let (h, m) = hour.trim().split_once(':').ok_or_else(invalid)?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return Err(invalid());
    }
    let h: u32 = h.parse().map_err(|_| invalid())?;
    let m: u32 = m.parse().map_err(|_| invalid())?;
    if h > 23 || m > 59 {
        return Err(invalid());
    }
    Ok(format!("{h:02}:{m:02}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_normalization() {
        assert_eq!(normalize_hour("8:00").unwrap(), "08:00");
        assert_eq!(normalize_hour(" 18:30 ").unwrap(), "18:30");
        assert!(normalize_hour("24:00").is_err());
        assert!(normalize_hour("8").is_err());
        assert!(normalize_hour("08:0").is_err());
        assert!(normalize_hour("ab:cd").is_err());
    }

    #[test]
    fn test_deserialize_normalizes() {
        let slot: SlotSelection =
            serde_json::from_str(r#"{"day":"monday","hour":"9:15"}"#).unwrap();
        assert_eq!(slot.hour, "09:15");
        assert!(serde_json::from_str::<SlotSelection>(r#"{"day":"monday","hour":"9"}"#).is_err());
    }

    #[test]
    fn test_ordering_follows_calendar() {
        let a = SlotSelection::new(StudioDay::Monday, "18:00").unwrap();
        let b = SlotSelection::new(StudioDay::Tuesday, "08:00").unwrap();
        let c = SlotSelection::new(StudioDay::Tuesday, "09:00").unwrap();
        assert!(a < b && b < c);
    }
}
