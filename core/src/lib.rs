//! circ core types
//!
//! This crate provides the foundational types used throughout circ:
//! - Identity types (MemberId, AdminId, LoanId, BookKey, AuthorId, CategoryId)
//! - Records (Book, Member, Administrator, Loan) and their status enums
//! - Monetary amounts for fines
//! - Input validation (book keys, email addresses)
//! - Stable user-facing messages

mod amount;
mod entity;
mod error;
mod id;
pub mod messages;
pub mod validate;

pub use amount::*;
pub use entity::*;
pub use error::*;
pub use id::*;
