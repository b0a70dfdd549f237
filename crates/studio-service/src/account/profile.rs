//! Normalization of member profile fields, shared by registration and
//! admin edits.

use validator::ValidateEmail;

use studio_core::config::BookingConfig;
use studio_core::error::AppError;
use studio_core::result::AppResult;

/// Trimmed and lowercased email, or `Validation`.
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(AppError::validation("Email address is not valid"));
    }
    Ok(email)
}

/// Phone number reduced to its digits. Spaces, dashes, and a leading `+`
/// are accepted on input.
pub fn normalize_phone(phone: &str) -> AppResult<String> {
    let trimmed = phone.trim();
    let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if rest.chars().any(|c| !(c.is_ascii_digit() || c == ' ' || c == '-')) {
        return Err(AppError::validation("Phone number may only contain digits"));
    }
    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    if !(6..=15).contains(&digits.len()) {
        return Err(AppError::validation(
            "Phone number must have between 6 and 15 digits",
        ));
    }
    Ok(digits)
}

pub fn require_name(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

pub fn check_weekly_quota(quota: i16, config: &BookingConfig) -> AppResult<()> {
    if quota < config.min_weekly_quota || quota > config.max_weekly_quota {
        return Err(AppError::validation(format!(
            "Weekly quota must be between {} and {}",
            config.min_weekly_quota, config.max_weekly_quota
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_lowercased() {
        assert_eq!(normalize_email("  Ana@Example.COM ").unwrap(), "ana@example.com");
        assert!(normalize_email("not-an-email").is_err());
    }

    #[test]
    fn test_phone_keeps_digits() {
        assert_eq!(normalize_phone("+54 11 5555-1234").unwrap(), "541155551234");
        assert!(normalize_phone("11-abc").is_err());
        assert!(normalize_phone("123").is_err());
    }

    #[test]
    fn test_quota_bounds() {
        let config = BookingConfig::default();
        assert!(check_weekly_quota(1, &config).is_ok());
        assert!(check_weekly_quota(3, &config).is_ok());
        assert!(check_weekly_quota(0, &config).is_err());
        assert!(check_weekly_quota(4, &config).is_err());
    }
}
