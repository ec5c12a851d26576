//! circ store
//!
//! Storage for the catalog, member accounts and the transaction ledger.
//!
//! Responsibilities:
//! - Define the storage seams (`MemberStore`, `CatalogStore`, `Ledger`)
//! - Run atomic units of work through `LendingStore::transaction`
//! - Enforce one active loan per book and per (member, book) as a backstop
//! - Bound lock waits instead of blocking indefinitely
//!
//! Two backends are provided: [`MemoryStore`] (undo-log transactions over
//! in-process tables) and [`SqliteStore`] (durable, `BEGIN IMMEDIATE`).

use std::time::Duration;

mod error;
mod gate;
mod memory;
mod sqlite;
mod traits;

pub use error::{Constraint, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::{schema, SqliteStore};
pub use traits::{
    CatalogStore, LendingStore, Ledger, MemberStore, StoreTxn, REMOVED_BOOK_TITLE,
};

/// Default bound on waiting for a concurrent transaction.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);
