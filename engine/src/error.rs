//! Lending error types.

use circ_core::{messages, BookKey, MemberId};
use circ_store::StoreError;
use thiserror::Error;

/// Why a borrow or return did not happen.
///
/// Every variant except [`LendingError::StoreUnavailable`] is a business
/// rejection: the request was well-formed but the ledger says no.
#[derive(Debug, Error)]
pub enum LendingError {
    #[error("member {member} is not active or does not exist")]
    InvalidMember { member: MemberId },

    #[error("book {book} does not exist")]
    InvalidBook { book: String },

    #[error("member {member} has {count} overdue loan(s)")]
    OverdueBlock { member: MemberId, count: u64 },

    #[error("member {member} already holds book {book}")]
    DuplicateLoan { member: MemberId, book: BookKey },

    #[error("book {book} is on loan to another member")]
    Unavailable { book: BookKey },

    #[error("member {member} has no active loan of book {book}")]
    NoActiveLoan { member: MemberId, book: String },

    /// The store could not complete the unit of work; nothing was changed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// Discriminant of [`LendingError`], for callers that branch on the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidMember,
    InvalidBook,
    OverdueBlock,
    DuplicateLoan,
    Unavailable,
    NoActiveLoan,
    StoreUnavailable,
}

impl FailureKind {
    /// The stable user-facing message for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            FailureKind::InvalidMember => messages::ERR_INVALID_MEMBER,
            FailureKind::InvalidBook => messages::ERR_INVALID_BOOK,
            FailureKind::OverdueBlock => messages::ERR_OVERDUE_BLOCK,
            FailureKind::DuplicateLoan => messages::ERR_DUPLICATE_LOAN,
            FailureKind::Unavailable => messages::ERR_UNAVAILABLE,
            FailureKind::NoActiveLoan => messages::ERR_NO_ACTIVE_LOAN,
            FailureKind::StoreUnavailable => messages::ERR_STORE_UNAVAILABLE,
        }
    }
}

impl LendingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LendingError::InvalidMember { .. } => FailureKind::InvalidMember,
            LendingError::InvalidBook { .. } => FailureKind::InvalidBook,
            LendingError::OverdueBlock { .. } => FailureKind::OverdueBlock,
            LendingError::DuplicateLoan { .. } => FailureKind::DuplicateLoan,
            LendingError::Unavailable { .. } => FailureKind::Unavailable,
            LendingError::NoActiveLoan { .. } => FailureKind::NoActiveLoan,
            LendingError::StoreUnavailable(_) => FailureKind::StoreUnavailable,
        }
    }

    /// True for the business rejections, false for infrastructure failures.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, LendingError::StoreUnavailable(_))
    }

    pub fn message(&self) -> &'static str {
        self.kind().message()
    }
}

/// Result type for lending operations.
pub type LendingResult<T> = Result<T, LendingError>;
