//! In-memory store.
//!
//! Writes are applied to the tables as they happen and recorded in an undo
//! log. Commit forgets the log; rollback replays it in reverse. A handle that
//! is dropped without committing (for instance while unwinding from a panic
//! inside the transaction closure) rolls back as well, so the tables never
//! keep a partial unit of work.

mod tables;
mod undo;

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use circ_core::{
    Administrator, AdminId, Amount, Availability, AuthorId, Book, BookKey, BookListing, Category,
    CategoryId, Loan, LoanId, LoanRecord, Member, MemberId, MemberStatus, NewAdministrator,
    NewBook, NewLoan, NewMember,
};

use crate::error::{Constraint, StoreError, StoreResult};
use crate::gate::{GatePass, WriterGate};
use crate::DEFAULT_LOCK_TIMEOUT;
use crate::traits::{
    CatalogStore, LendingStore, Ledger, MemberStore, StoreTxn, REMOVED_BOOK_TITLE,
};
use tables::Tables;
use undo::{UndoEntry, UndoLog};

/// A volatile store holding everything in process memory.
#[derive(Debug)]
pub struct MemoryStore {
    gate: WriterGate,
    tables: Mutex<Tables>,
    lock_timeout: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with the default categories seeded.
    pub fn new() -> Self {
        Self {
            gate: WriterGate::new(),
            tables: Mutex::new(Tables::new()),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

impl LendingStore for MemoryStore {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>,
    {
        let pass = self.gate.acquire(self.lock_timeout)?;
        // Writers are serialized by the gate; a poisoned table lock only means
        // a previous closure panicked, and its writes were already undone.
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let mut txn = MemoryTxn {
            tables,
            undo: UndoLog::new(),
            committed: false,
            _pass: pass,
        };

        let result = f(&mut txn);
        match result {
            Ok(value) => {
                txn.commit();
                Ok(value)
            }
            Err(err) => {
                txn.rollback();
                Err(err)
            }
        }
    }
}

/// Transactional handle over the locked tables.
struct MemoryTxn<'s> {
    tables: MutexGuard<'s, Tables>,
    undo: UndoLog,
    committed: bool,
    // Declared last so the gate opens only after the tables are released.
    _pass: GatePass<'s>,
}

impl MemoryTxn<'_> {
    fn commit(&mut self) {
        self.undo.clear();
        self.committed = true;
    }

    fn rollback(&mut self) {
        let undone = self.undo.len();
        self.undo.rollback(&mut self.tables);
        if undone > 0 {
            tracing::warn!(undone, "memory store transaction rolled back");
        }
    }
}

impl Drop for MemoryTxn<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}

impl MemberStore for MemoryTxn<'_> {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        Ok(self.tables.members.get(&id).cloned())
    }

    fn member_by_username(&self, username: &str) -> StoreResult<Option<Member>> {
        Ok(self.tables.member_by_username(username).cloned())
    }

    fn email_in_use(&self, email: &str) -> StoreResult<bool> {
        Ok(self.tables.email_in_use(email))
    }

    fn insert_member(&mut self, member: NewMember) -> StoreResult<MemberId> {
        let id = self.tables.alloc_member_id();
        self.tables.insert_member(member.into_member(id))?;
        self.undo.record(UndoEntry::MemberInserted(id));
        Ok(id)
    }

    fn set_member_status(&mut self, id: MemberId, status: MemberStatus) -> StoreResult<()> {
        self.update_member(id, |member| member.status = status)
    }

    fn record_login(&mut self, id: MemberId, at: NaiveDateTime) -> StoreResult<()> {
        self.update_member(id, |member| member.last_login = Some(at))
    }

    fn list_members(&self) -> StoreResult<Vec<Member>> {
        let mut members: Vec<Member> = self.tables.members.values().cloned().collect();
        members.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(members)
    }

    fn admin_by_username(&self, username: &str) -> StoreResult<Option<Administrator>> {
        Ok(self.tables.admin_by_username(username).cloned())
    }

    fn insert_admin(&mut self, admin: NewAdministrator) -> StoreResult<AdminId> {
        let id = self.tables.insert_admin(admin)?;
        self.undo.record(UndoEntry::AdminInserted(id));
        Ok(id)
    }
}

impl MemoryTxn<'_> {
    fn update_member(&mut self, id: MemberId, edit: impl FnOnce(&mut Member)) -> StoreResult<()> {
        let mut member = self
            .tables
            .members
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("member {id}")))?;
        edit(&mut member);
        if let Some(previous) = self.tables.replace_member(member) {
            self.undo.record(UndoEntry::MemberReplaced(previous));
        }
        Ok(())
    }

    fn listing(&self, book: &Book) -> BookListing {
        let author = self
            .tables
            .authors
            .get(&book.author_id)
            .map(|a| a.name.clone())
            .unwrap_or_default();
        let category = self
            .tables
            .categories
            .get(&book.category_id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        BookListing {
            key: book.key.clone(),
            title: book.title.clone(),
            author,
            category,
            availability: book.availability,
        }
    }
}

impl CatalogStore for MemoryTxn<'_> {
    fn get_book(&self, key: &BookKey) -> StoreResult<Option<Book>> {
        Ok(self.tables.books.get(key).cloned())
    }

    fn set_availability(
        &mut self,
        key: &BookKey,
        availability: Availability,
    ) -> StoreResult<()> {
        let book = self
            .tables
            .books
            .get_mut(key)
            .ok_or_else(|| StoreError::not_found(format!("book {key}")))?;
        let previous = std::mem::replace(&mut book.availability, availability);
        self.undo.record(UndoEntry::AvailabilityChanged {
            key: key.clone(),
            previous,
        });
        Ok(())
    }

    fn insert_book(&mut self, book: NewBook) -> StoreResult<()> {
        let key = book.key.clone();
        self.tables.insert_book(book.into_book())?;
        self.undo.record(UndoEntry::BookInserted(key));
        Ok(())
    }

    fn delete_book(&mut self, key: &BookKey) -> StoreResult<()> {
        if self.tables.loan_index.active_for_book(key).is_some() {
            return Err(StoreError::conflict(Constraint::BookOnLoan));
        }
        let book = self
            .tables
            .remove_book(key)
            .ok_or_else(|| StoreError::not_found(format!("book {key}")))?;
        self.undo.record(UndoEntry::BookDeleted(book));
        Ok(())
    }

    fn find_author(&self, name: &str) -> StoreResult<Option<AuthorId>> {
        Ok(self.tables.author_by_name(name))
    }

    fn insert_author(&mut self, name: &str) -> StoreResult<AuthorId> {
        let id = self.tables.insert_author(name)?;
        self.undo.record(UndoEntry::AuthorInserted(id));
        Ok(id)
    }

    fn find_category(&self, name: &str) -> StoreResult<Option<CategoryId>> {
        Ok(self.tables.category_by_name(name))
    }

    fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut categories: Vec<Category> = self.tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn list_books(&self, search: Option<&str>) -> StoreResult<Vec<BookListing>> {
        let mut listings: Vec<BookListing> = self
            .tables
            .books
            .values()
            .map(|book| self.listing(book))
            .filter(|listing| search.map_or(true, |term| listing.matches(term)))
            .collect();
        listings.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.key.cmp(&b.key)));
        Ok(listings)
    }
}

impl Ledger for MemoryTxn<'_> {
    fn insert_loan(&mut self, loan: NewLoan) -> StoreResult<LoanId> {
        let id = self.tables.alloc_loan_id();
        self.tables.insert_loan(loan.into_loan(id))?;
        self.undo.record(UndoEntry::LoanInserted(id));
        Ok(id)
    }

    fn find_active_loan(&self, member: MemberId, key: &BookKey) -> StoreResult<Option<Loan>> {
        Ok(self
            .active_loan_for_book(key)?
            .filter(|loan| loan.member_id == member))
    }

    fn active_loan_for_book(&self, key: &BookKey) -> StoreResult<Option<Loan>> {
        Ok(self
            .tables
            .loan_index
            .active_for_book(key)
            .and_then(|id| self.tables.loans.get(&id))
            .cloned())
    }

    fn count_overdue(&self, member: MemberId, as_of: NaiveDate) -> StoreResult<u64> {
        let overdue = self
            .tables
            .loan_index
            .for_member(member)
            .filter_map(|id| self.tables.loans.get(&id))
            .filter(|loan| loan.is_overdue(as_of))
            .count();
        Ok(overdue as u64)
    }

    fn close_loan(&mut self, id: LoanId, return_date: NaiveDate, fine: Amount) -> StoreResult<()> {
        let mut loan = self
            .tables
            .loans
            .get(&id)
            .filter(|loan| loan.is_active())
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("active loan {id}")))?;
        loan.close(return_date, fine);
        if let Some(previous) = self.tables.replace_loan(loan) {
            self.undo.record(UndoEntry::LoanReplaced(previous));
        }
        Ok(())
    }

    fn list_loans(&self, member: MemberId) -> StoreResult<Vec<LoanRecord>> {
        let mut records: Vec<LoanRecord> = self
            .tables
            .loan_index
            .for_member(member)
            .filter_map(|id| self.tables.loans.get(&id))
            .map(|loan| LoanRecord {
                title: self
                    .tables
                    .books
                    .get(&loan.book_key)
                    .map_or_else(|| REMOVED_BOOK_TITLE.to_string(), |b| b.title.clone()),
                loan: loan.clone(),
            })
            .collect();
        records.sort_by(|a, b| {
            b.loan
                .issue_date
                .cmp(&a.loan.issue_date)
                .then(b.loan.id.cmp(&a.loan.id))
        });
        Ok(records)
    }
}
