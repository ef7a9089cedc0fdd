use std::sync::OnceLock;

use regex::Regex;

use super::entity::User;
use crate::domain::{DomainError, DomainResult};

// Intentionally loose: one "@", non-empty local part and domain with a dot.
// Matching stays case-sensitive end to end.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn email_regex() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("valid email pattern"))
}

/// Validates all User invariants
pub fn validate_user(user: &User) -> DomainResult<()> {
    validate_name(&user.name)?;
    validate_email(&user.email)?;
    Ok(())
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::InvariantViolation(
            "User name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> DomainResult<()> {
    if !email_regex().is_match(email) {
        return Err(DomainError::InvariantViolation(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    #[test]
    fn test_valid_user() {
        let user = User::new(
            "Ada Lovelace".to_string(),
            "ada@example.com".to_string(),
            UserRole::Student,
        );
        assert!(validate_user(&user).is_ok());
    }

    #[test]
    fn test_empty_name_fails() {
        let user = User::new(
            "   ".to_string(),
            "ada@example.com".to_string(),
            UserRole::Student,
        );
        assert!(validate_user(&user).is_err());
    }

    #[test]
    fn test_malformed_emails_fail() {
        for email in ["", "no-at-sign", "a@b", "two@@example.com", "spaces @example.com"] {
            assert!(validate_email(email).is_err(), "accepted: {}", email);
        }
    }

    #[test]
    fn test_email_is_case_sensitive_data() {
        // Upper and lower case variants are both valid and distinct values.
        assert!(validate_email("Ada@Example.com").is_ok());
        assert!(validate_email("ada@example.com").is_ok());
    }
}
