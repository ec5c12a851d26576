//! circ session
//!
//! Authenticated access to the library. Every operation takes an explicit
//! [`Session`] naming who is acting; member and administrator capabilities are
//! checked here, so front ends only translate input and render results.

mod auth;
mod error;
mod library;
mod session;

pub use auth::{hash_password, verify_password};
pub use error::{SessionError, SessionResult};
pub use library::{BookForm, Library, MemberTransactions, RegistrationForm, TransactionStats};
pub use session::{Role, Session};
