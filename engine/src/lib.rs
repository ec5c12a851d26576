//! circ engine
//!
//! The lending transaction engine: the only component that opens and closes
//! loans or flips book availability.
//!
//! Responsibilities:
//! - Borrow: check member, book, overdue hold, duplicate and availability, in
//!   that order, then open a loan
//! - Return: close the member's active loan and compute the fine
//! - Answer ledger queries for front ends
//!
//! Time comes from an injected [`Clock`]; nothing reads ambient state.

mod clock;
mod engine;
mod error;
mod receipt;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::LendingEngine;
pub use error::{FailureKind, LendingError, LendingResult};
pub use receipt::ReturnReceipt;
