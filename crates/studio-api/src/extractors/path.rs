//! Typed path parameter helpers.
//!
//! Handlers take raw `Path<String>` segments and parse them here so a bad
//! segment produces the same JSON error body as every other failure.

use std::str::FromStr;

use chrono::NaiveDate;

use studio_core::error::AppError;

/// Parses an identifier (`UserId`, `TurnId`, ...) from a path segment.
pub fn parse_id<T: FromStr>(s: &str) -> Result<T, AppError> {
    s.parse()
        .map_err(|_| AppError::validation(format!("Invalid identifier: {s}")))
}

/// Parses a `YYYY-MM-DD` date from a path segment.
pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date '{s}', expected YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::types::UserId;

    #[test]
    fn test_parse_helpers() {
        let id = UserId::new();
        assert_eq!(parse_id::<UserId>(&id.to_string()).unwrap(), id);
        assert!(parse_id::<UserId>("42").is_err());
        assert_eq!(
            parse_date("2025-03-24").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 24).unwrap()
        );
        assert!(parse_date("24/03/2025").is_err());
    }
}
