use std::sync::OnceLock;

use regex::Regex;

use crate::error::{DirectoryError, FieldError, Result};
use crate::types::NewUser;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[\d\s\-\+\(\)]+$").unwrap())
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

/// Digits, spaces and `-+()` only, with at least 10 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    phone_re().is_match(phone) && phone.chars().filter(char::is_ascii_digit).count() >= 10
}

/// Check every field of a new user, reporting all failures at once.
pub fn validate_new_user(user: &NewUser) -> Result<()> {
    let mut errors = Vec::new();
    let mut reject = |field, message| errors.push(FieldError { field, message });

    if user.name.trim().is_empty() {
        reject("name", "Name is required");
    }

    if user.email.trim().is_empty() {
        reject("email", "Email is required");
    } else if !is_valid_email(&user.email) {
        reject("email", "Invalid email format");
    }

    if user.phone.trim().is_empty() {
        reject("phone", "Phone is required");
    } else if !is_valid_phone(&user.phone) {
        reject("phone", "Invalid phone format (at least 10 digits)");
    }

    if user.company.trim().is_empty() {
        reject("company", "Company is required");
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DirectoryError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> NewUser {
        NewUser {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "(123) 456-7890".to_string(),
            company: "Acme Corporation".to_string(),
        }
    }

    fn rejected_fields(user: &NewUser) -> Vec<&'static str> {
        match validate_new_user(user) {
            Err(DirectoryError::Validation(errors)) => errors.iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_user() {
        assert!(validate_new_user(&valid()).is_ok());
    }

    #[test]
    fn test_email_format() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.d"));
        assert!(!is_valid_email("@c.d"));
    }

    #[test]
    fn test_phone_format() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(is_valid_phone("1234567890"));
        assert!(!is_valid_phone("123-4567"));
        assert!(!is_valid_phone("555-123-4567 x12"));
    }

    #[test]
    fn test_reports_every_field() {
        let user = NewUser {
            name: "  ".to_string(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
        };
        assert_eq!(
            rejected_fields(&user),
            vec!["name", "email", "phone", "company"]
        );
    }

    #[test]
    fn test_messages() {
        let mut user = valid();
        user.email = "nope".to_string();
        user.phone = "12345".to_string();

        let err = validate_new_user(&user).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid user: email: Invalid email format, phone: Invalid phone format (at least 10 digits)"
        );
    }
}
