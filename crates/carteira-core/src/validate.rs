//! # Shape Validation
//!
//! The [`Validate`] trait and the field checks shared by both entities.

use crate::error::ValidationError;

/// Types whose constraints go beyond what serde deserialization checks.
pub trait Validate {
    /// Check every constraint, returning the first violation.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A required text field: non-blank and at most `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// An optional text field: when present, the same rules as [`required_text`].
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => required_text(field, v, max),
        None => Ok(()),
    }
}

/// A positive identifier referencing another record.
pub(crate) fn positive_id(field: &'static str, value: Option<i32>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v <= 0 => Err(ValidationError::OutOfRange {
            field,
            expected: "greater than 0",
        }),
        _ => Ok(()),
    }
}
