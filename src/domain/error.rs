//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated preconditions of a forest operation.
///
/// Every editor operation is all-or-nothing: when one of these is returned
/// the caller's forest is untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A required field is missing or blank.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// The operation targets an organization id absent from the forest.
    #[error("organization not found: {id}")]
    NotFound { id: String },

    /// The operation would break the forest's shape (non-leaf removal, cycle).
    #[error("conflict on {id}: {message}")]
    Conflict { id: String, message: String },

    /// Input forest carries the same organization id twice.
    #[error("duplicate organization id: {0}")]
    DuplicateId(String),

    /// The highest id suffix has no successor.
    #[error("organization id space exhausted after {last}")]
    IdSpaceExhausted { last: String },
}

impl DomainError {
    pub fn missing_fields() -> Self {
        Self::Validation {
            message: "missing fields".into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn conflict(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conflict {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
