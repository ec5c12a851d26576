//! Storage seams consumed by the lending engine and the session layer.
//!
//! Every read and write happens through a [`StoreTxn`] handed out by
//! [`LendingStore::transaction`]; there is no way to touch a store outside a
//! transaction.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use circ_core::{
    Administrator, AdminId, Amount, Availability, AuthorId, Book, BookKey, BookListing, Category,
    CategoryId, Loan, LoanId, LoanRecord, Member, MemberId, MemberStatus, NewAdministrator,
    NewBook, NewLoan, NewMember,
};

use crate::error::{StoreError, StoreResult};

/// Member and administrator accounts.
pub trait MemberStore {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>>;

    fn member_by_username(&self, username: &str) -> StoreResult<Option<Member>>;

    fn email_in_use(&self, email: &str) -> StoreResult<bool>;

    fn insert_member(&mut self, member: NewMember) -> StoreResult<MemberId>;

    fn set_member_status(&mut self, id: MemberId, status: MemberStatus) -> StoreResult<()>;

    /// Stamp a successful login.
    fn record_login(&mut self, id: MemberId, at: NaiveDateTime) -> StoreResult<()>;

    /// All members, newest registration first.
    fn list_members(&self) -> StoreResult<Vec<Member>>;

    fn admin_by_username(&self, username: &str) -> StoreResult<Option<Administrator>>;

    fn insert_admin(&mut self, admin: NewAdministrator) -> StoreResult<AdminId>;
}

/// Book identity, metadata and availability.
pub trait CatalogStore {
    fn get_book(&self, key: &BookKey) -> StoreResult<Option<Book>>;

    /// Flip the availability flag. Only the lending engine calls this.
    fn set_availability(&mut self, key: &BookKey, availability: Availability)
        -> StoreResult<()>;

    fn insert_book(&mut self, book: NewBook) -> StoreResult<()>;

    /// Remove a book. Fails with a `BookOnLoan` conflict while an active loan
    /// references it.
    fn delete_book(&mut self, key: &BookKey) -> StoreResult<()>;

    fn find_author(&self, name: &str) -> StoreResult<Option<AuthorId>>;

    fn insert_author(&mut self, name: &str) -> StoreResult<AuthorId>;

    fn find_category(&self, name: &str) -> StoreResult<Option<CategoryId>>;

    fn list_categories(&self) -> StoreResult<Vec<Category>>;

    /// Books with author and category names, ordered by title. `search`
    /// filters case-insensitively on title, author or category.
    fn list_books(&self, search: Option<&str>) -> StoreResult<Vec<BookListing>>;
}

/// The transaction ledger: one row per loan lifecycle.
pub trait Ledger {
    /// Open a loan. Fails with a conflict if the book or the (member, book)
    /// pair already has an active loan.
    fn insert_loan(&mut self, loan: NewLoan) -> StoreResult<LoanId>;

    fn find_active_loan(&self, member: MemberId, key: &BookKey) -> StoreResult<Option<Loan>>;

    fn active_loan_for_book(&self, key: &BookKey) -> StoreResult<Option<Loan>>;

    fn has_active_loan(&self, key: &BookKey) -> StoreResult<bool> {
        Ok(self.active_loan_for_book(key)?.is_some())
    }

    /// Active loans of `member` whose due date is strictly before `as_of`.
    fn count_overdue(&self, member: MemberId, as_of: NaiveDate) -> StoreResult<u64>;

    /// Close an active loan. Fails with `NotFound` if the loan is not active.
    fn close_loan(&mut self, id: LoanId, return_date: NaiveDate, fine: Amount)
        -> StoreResult<()>;

    /// Loans of `member`, most recent first, joined with book titles.
    fn list_loans(&self, member: MemberId) -> StoreResult<Vec<LoanRecord>>;
}

/// Handle for one atomic unit of work against a store.
pub trait StoreTxn: MemberStore + CatalogStore + Ledger {}

impl<T: MemberStore + CatalogStore + Ledger> StoreTxn for T {}

/// A store that can run atomic units of work.
pub trait LendingStore: Send + Sync {
    /// Run `f` inside one transaction.
    ///
    /// Commits when `f` returns `Ok` and rolls every write back when it
    /// returns `Err`. Waiting for a concurrent transaction is bounded by the
    /// store's lock timeout; on expiry the call fails with
    /// [`StoreError::Timeout`] without running `f`. Nothing is retried.
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>;
}

impl<S: LendingStore> LendingStore for Arc<S> {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>,
    {
        (**self).transaction(f)
    }
}

/// Title shown for ledger rows whose book has since left the catalog.
pub const REMOVED_BOOK_TITLE: &str = "(removed from catalog)";
