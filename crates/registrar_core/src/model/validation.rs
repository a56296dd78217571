//! Field validation shared by every record constructor and patch.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
        .expect("valid email regex")
});

/// Field-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace only.
    EmptyField(&'static str),
    /// Age parsed but is zero or negative.
    NonPositiveAge(i64),
    /// Age text is not a decimal integer.
    InvalidAge(String),
    /// Email does not match `local@domain.tld`.
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::NonPositiveAge(age) => write!(f, "age must be positive, got {age}"),
            Self::InvalidAge(raw) => write!(f, "age `{raw}` is not an integer"),
            Self::InvalidEmail(email) => write!(f, "email `{email}` is not in the correct format"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Rejects empty or whitespace-only values for a named field.
pub fn require_non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Rejects ages that are not strictly positive.
pub fn validate_age(age: i64) -> ValidationResult<()> {
    if age <= 0 {
        return Err(ValidationError::NonPositiveAge(age));
    }
    Ok(())
}

/// Parses form/document age text into a positive integer.
pub fn parse_age(raw: &str) -> ValidationResult<i64> {
    let age = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidAge(raw.to_string()))?;
    validate_age(age)?;
    Ok(age)
}

/// Returns whether `email` matches the accepted address pattern.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_email(email: &str) -> ValidationResult<()> {
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(())
}
