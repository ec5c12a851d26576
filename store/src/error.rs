//! Store error types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Storage-level integrity rules that a write can trip over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// At most one active loan per book.
    ActiveLoanPerBook,
    /// At most one active loan per (member, book).
    ActiveLoanPerMemberBook,
    /// A book with an active loan cannot be deleted.
    BookOnLoan,
    /// Book keys are unique.
    BookKey,
    MemberUsername,
    MemberEmail,
    AdminUsername,
    AuthorName,
    /// A referenced row does not exist.
    ForeignKey,
    /// Anything the backend reported that we do not classify.
    Other(String),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::ActiveLoanPerBook => f.write_str("one active loan per book"),
            Constraint::ActiveLoanPerMemberBook => {
                f.write_str("one active loan per member and book")
            }
            Constraint::BookOnLoan => f.write_str("book has an active loan"),
            Constraint::BookKey => f.write_str("unique book key"),
            Constraint::MemberUsername => f.write_str("unique member username"),
            Constraint::MemberEmail => f.write_str("unique member email"),
            Constraint::AdminUsername => f.write_str("unique administrator username"),
            Constraint::AuthorName => f.write_str("unique author name"),
            Constraint::ForeignKey => f.write_str("foreign key"),
            Constraint::Other(message) => f.write_str(message),
        }
    }
}

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached or failed mid-operation.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Another transaction held the store for longer than the lock timeout.
    #[error("timed out after {waited_ms} ms waiting for the store")]
    Timeout { waited_ms: u64 },

    /// A write violated an integrity rule.
    #[error("constraint violated: {constraint}")]
    Conflict { constraint: Constraint },

    /// The row targeted by an update or delete does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A stored row could not be decoded into a record.
    #[error("corrupt record: {message}")]
    Corrupt { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn timeout(waited: Duration) -> Self {
        Self::Timeout {
            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn conflict(constraint: Constraint) -> Self {
        Self::Conflict { constraint }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// The constraint this error reports, if it is a conflict.
    pub fn constraint(&self) -> Option<&Constraint> {
        match self {
            StoreError::Conflict { constraint } => Some(constraint),
            _ => None,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
