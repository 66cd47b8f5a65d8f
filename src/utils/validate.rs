use crate::error::{AppError, AppResult};
use regex::Regex;

/// Usernames: 3-30 chars, lowercase letters, digits, underscores, hyphens.
pub fn validate_user_name(user_name: &str) -> AppResult<()> {
    let user_name_regex = Regex::new(r"^[a-z0-9_-]{3,30}$").unwrap();

    if !user_name_regex.is_match(user_name) {
        return Err(AppError::ValidationError(
            "Username must be 3-30 lowercase letters, digits, underscores or hyphens".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    let email_regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();

    if !email_regex.is_match(email) {
        return Err(AppError::ValidationError(
            "Invalid email address".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_user_name() {
        assert!(validate_user_name("acme_billing-01").is_ok());
        assert!(validate_user_name("ab").is_err());
        assert!(validate_user_name("UpperCase").is_err());
        assert!(validate_user_name("has space").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("someone@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@example.com").is_err());
        assert!(validate_email("spaces in@example.com").is_err());
    }
}
