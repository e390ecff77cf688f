//! Field validation rules for cabinets and cassettes.
//!
//! Every rule is a pure function. Failures carry a human-readable reason that
//! is surfaced to the caller unchanged.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use crate::shelf::{MAX_SHELF, MIN_SHELF};

/// Release year of the earliest surviving film.
pub const EARLIEST_RELEASE_YEAR: i32 = 1888;

/// Punctuation accepted in titles and director names, besides letters,
/// digits and whitespace.
pub const ALLOWED_PUNCTUATION: &str = ".,!?-'\":;()";

static TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9 \t\r\n.,!?'":;()\-]+$"#).expect("valid regex")
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidLetter(String),

    #[error("{0}")]
    InvalidShelf(String),

    #[error("{0}")]
    InvalidYear(String),

    #[error("{0}")]
    InvalidText(String),
}

/// Validate a cabinet letter and normalize it to uppercase.
///
/// The input must be exactly one ASCII alphabetic character. No trimming is
/// applied: `" a"` is rejected.
pub fn validate_letter(input: &str) -> Result<char, ValidationError> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c.to_ascii_uppercase()),
        _ => Err(ValidationError::InvalidLetter(
            "Letter must be a single alphabetic character".to_string(),
        )),
    }
}

/// Validate that a shelf number is in `[1, 4]`.
pub fn validate_shelf(shelf: i32) -> Result<i32, ValidationError> {
    if !(MIN_SHELF..=MAX_SHELF).contains(&shelf) {
        return Err(ValidationError::InvalidShelf(format!(
            "Shelf must be between {MIN_SHELF} and {MAX_SHELF}"
        )));
    }
    Ok(shelf)
}

/// Validate a release year against the current calendar year (UTC).
pub fn validate_year(year: i32) -> Result<i32, ValidationError> {
    validate_year_against(year, chrono::Utc::now().year())
}

/// Validate a release year against an explicit upper bound.
pub fn validate_year_against(year: i32, current_year: i32) -> Result<i32, ValidationError> {
    if !(EARLIEST_RELEASE_YEAR..=current_year).contains(&year) {
        return Err(ValidationError::InvalidYear(format!(
            "Release year must be between {EARLIEST_RELEASE_YEAR} and {current_year}"
        )));
    }
    Ok(year)
}

/// Validate free text against the allowed character set.
///
/// An empty string passes unchanged and is treated as "absent" by callers.
pub fn validate_text(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.is_empty() || TEXT_RE.is_match(value) {
        return Ok(());
    }
    Err(ValidationError::InvalidText(format!(
        "{field} contains invalid characters; only English letters, digits, spaces \
         and {ALLOWED_PUNCTUATION} are allowed"
    )))
}

/// Validate a required text field, returning it trimmed.
pub fn validate_required_text(value: &str, field: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidText(format!(
            "{field} must not be empty"
        )));
    }
    validate_text(trimmed, field)?;
    Ok(trimmed.to_string())
}

/// Validate an optional text field. Absent, empty and whitespace-only values
/// all collapse to `None`.
pub fn validate_optional_text(
    value: Option<&str>,
    field: &str,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            validate_text(trimmed, field)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}
