//! # Validation Errors
//!
//! Shape and constraint failures detected before a request reaches the
//! service layer. Each variant names the offending field so clients can
//! correct the payload without guesswork.

use thiserror::Error;

/// A payload failed shape or constraint checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty or whitespace only.
    #[error("{field} must not be empty")]
    Blank {
        /// Field name as it appears on the wire.
        field: &'static str,
    },

    /// A text field exceeds its maximum length.
    #[error("{field} must not exceed {max} characters")]
    TooLong {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Maximum number of characters.
        max: usize,
    },

    /// A field is present but not in the expected format.
    #[error("invalid {field}: \"{value}\" ({reason})")]
    Malformed {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// The rejected value.
        value: String,
        /// What the value should look like.
        reason: &'static str,
    },

    /// A numeric or date field is outside its allowed range.
    #[error("{field} must be {expected}")]
    OutOfRange {
        /// Field name as it appears on the wire.
        field: &'static str,
        /// Human-readable description of the allowed range.
        expected: &'static str,
    },

    /// A create request carried an identifier.
    #[error("id is assigned on create and must not be sent")]
    UnexpectedId,

    /// A full update by entity did not carry an identifier.
    #[error("id is required in the request body")]
    MissingId,

    /// The body identifier disagrees with the path identifier.
    #[error("body id {body} does not match path id {path}")]
    IdMismatch {
        /// Identifier taken from the request path.
        path: i32,
        /// Identifier taken from the request body.
        body: i32,
    },

    /// A delete-by-template request did not specify any field.
    #[error("filter must specify at least one field")]
    EmptyFilter,
}

impl ValidationError {
    /// Wire name of the offending field, if the failure concerns one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Blank { field }
            | Self::TooLong { field, .. }
            | Self::Malformed { field, .. }
            | Self::OutOfRange { field, .. } => Some(*field),
            Self::UnexpectedId | Self::MissingId | Self::IdMismatch { .. } => Some("id"),
            Self::EmptyFilter => None,
        }
    }
}
