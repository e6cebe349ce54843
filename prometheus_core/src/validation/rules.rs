//! Validation rules and custom validators

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use super::sanitize::sanitize_text;
use crate::content::Choice;

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$"
    ).unwrap();
}

pub const MAX_EMAIL_LENGTH: usize = 180;

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("email_empty"));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::new("email_too_long"));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::new("email_format"));
    }

    Ok(())
}

pub fn validate_min_chars(value: &str, min: usize) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        let mut err = ValidationError::new("too_short");
        err.add_param("min".into(), &min);
        return Err(err);
    }
    Ok(())
}

/// Sanitizes `candidate` and checks it against the allow-list.
///
/// A missing or blank candidate resolves to `default`.
pub fn validate_choice(
    options: &[Choice],
    candidate: Option<&str>,
    default: &str,
    max_chars: usize,
) -> Result<String, ValidationError> {
    let value = candidate
        .map(|raw| sanitize_text(raw, max_chars))
        .unwrap_or_default();

    if value.is_empty() {
        return Ok(default.to_string());
    }

    if options.iter().any(|option| option.value == value) {
        Ok(value)
    } else {
        let mut err = ValidationError::new("unknown_choice");
        err.add_param("value".into(), &value);
        Err(err)
    }
}
