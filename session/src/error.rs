//! Session error types.

use circ_core::{messages, BookKey, CoreError, MemberId};
use circ_engine::LendingError;
use circ_store::StoreError;
use thiserror::Error;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown user, wrong password, or an inactive member account.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session's role may not perform this action.
    #[error("{action} is not permitted for this role")]
    Forbidden { action: &'static str },

    /// Malformed input.
    #[error("{0}")]
    Invalid(#[from] CoreError),

    #[error("unknown category: {name}")]
    UnknownCategory { name: String },

    #[error("book {key} does not exist")]
    UnknownBook { key: BookKey },

    #[error("book {key} is already in the catalog")]
    DuplicateBook { key: BookKey },

    #[error("book {key} is on loan")]
    BookOnLoan { key: BookKey },

    #[error("member {id} does not exist")]
    UnknownMember { id: MemberId },

    #[error("username already exists: {username}")]
    UsernameTaken { username: String },

    #[error("email already exists: {email}")]
    EmailTaken { email: String },

    /// A borrow or return was rejected or could not be completed.
    #[error(transparent)]
    Lending(#[from] LendingError),

    /// The store failed outside a lending operation.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    pub fn forbidden(action: &'static str) -> Self {
        Self::Forbidden { action }
    }

    /// The text shown to the user.
    pub fn message(&self) -> String {
        match self {
            SessionError::InvalidCredentials => messages::ERR_INVALID_CREDENTIALS.to_string(),
            SessionError::Forbidden { .. } => messages::ERR_FORBIDDEN.to_string(),
            SessionError::BookOnLoan { .. } => messages::ERR_BOOK_ON_LOAN.to_string(),
            SessionError::Lending(err) => err.message().to_string(),
            SessionError::Store(_) => messages::ERR_STORE_UNAVAILABLE.to_string(),
            SessionError::UsernameTaken { .. } => "Username already exists".to_string(),
            SessionError::EmailTaken { .. } => "Email already exists".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
