//! Common error types for circ records.

use thiserror::Error;

/// Errors raised while building or parsing records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Book key is not 10 or 13 digits.
    #[error("invalid book key '{key}': expected 10 or 13 digits")]
    InvalidBookKey { key: String },

    /// Email address does not have a valid format.
    #[error("invalid email format: '{email}'")]
    InvalidEmail { email: String },

    /// A required field was empty.
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    /// A stored status string did not match any known variant.
    #[error("unknown {kind} status: '{value}'")]
    UnknownStatus { kind: &'static str, value: String },
}

impl CoreError {
    pub fn invalid_book_key(key: impl Into<String>) -> Self {
        Self::InvalidBookKey { key: key.into() }
    }

    pub fn invalid_email(email: impl Into<String>) -> Self {
        Self::InvalidEmail {
            email: email.into(),
        }
    }

    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn unknown_status(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownStatus {
            kind,
            value: value.into(),
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
