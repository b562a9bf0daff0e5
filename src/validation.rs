//! Field validators shared by the request DTOs.
//!
//! Every check returns a [`FieldError`] instead of failing the request
//! outright; the DTO `validate()` methods collect them so a response can
//! report all problems at once.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::FieldError;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 255;
pub const PASSWORD_MIN: usize = 8;
pub const PASSWORD_MAX: usize = 128;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn check_email(email: &str) -> Option<FieldError> {
    if !is_valid_email(email) {
        return Some(FieldError::new("email", "Invalid email address"));
    }
    None
}

pub fn check_name(name: &str) -> Option<FieldError> {
    let len = name.trim().chars().count();
    if len < NAME_MIN {
        return Some(FieldError::new(
            "name",
            format!("Name must be at least {NAME_MIN} characters"),
        ));
    }
    if len > NAME_MAX {
        return Some(FieldError::new(
            "name",
            format!("Name must be at most {NAME_MAX} characters"),
        ));
    }
    None
}

pub fn check_password(password: &str) -> Option<FieldError> {
    if password.len() < PASSWORD_MIN {
        return Some(FieldError::new(
            "password",
            format!("Password must be at least {PASSWORD_MIN} characters"),
        ));
    }
    if password.len() > PASSWORD_MAX {
        return Some(FieldError::new(
            "password",
            format!("Password must be at most {PASSWORD_MAX} characters"),
        ));
    }
    None
}

/// Path ids are taken as raw strings so a malformed id turns into a 400
/// validation error rather than a framework rejection.
pub fn parse_user_id(raw: &str) -> Result<i32, FieldError> {
    match raw.parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(FieldError::new("id", "Id must be a positive integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in ["", "plain", "no@tld", "two@@x.com", "spaces in@x.com"] {
            assert!(!is_valid_email(bad), "{bad:?} should be invalid");
        }
    }

    #[test]
    fn name_bounds() {
        assert!(check_name("A").is_some());
        assert!(check_name("Al").is_none());
        assert!(check_name(&"x".repeat(256)).is_some());
    }

    #[test]
    fn password_bounds() {
        assert!(check_password("short").is_some());
        assert!(check_password("Secret123").is_none());
        assert!(check_password(&"p".repeat(129)).is_some());
    }

    #[test]
    fn user_id_must_be_a_positive_integer() {
        assert_eq!(parse_user_id("5").unwrap(), 5);
        for bad in ["0", "-3", "abc", "1.5", "", "99999999999999999999"] {
            let err = parse_user_id(bad).unwrap_err();
            assert_eq!(err.field, "id");
        }
    }
}
