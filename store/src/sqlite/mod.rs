//! SQLite store.
//!
//! Each unit of work is a `BEGIN IMMEDIATE` transaction, so the writer lock is
//! taken before any precondition is read. Waiting is bounded twice: the
//! in-process writer gate and SQLite's `busy_timeout` for other processes
//! sharing the file.

mod rows;
pub mod schema;

use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};
use circ_core::{
    Administrator, AdminId, Amount, Availability, AuthorId, Book, BookKey, BookListing, Category,
    CategoryId, Loan, LoanId, LoanRecord, LoanStatus, Member, MemberId, MemberStatus,
    NewAdministrator, NewBook, NewLoan, NewMember, TransactionType,
};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::error::{StoreError, StoreResult};
use crate::gate::WriterGate;
use crate::DEFAULT_LOCK_TIMEOUT;
use crate::traits::{
    CatalogStore, LendingStore, Ledger, MemberStore, StoreTxn, REMOVED_BOOK_TITLE,
};
use rows::{ADMIN_COLUMNS, BOOK_COLUMNS, LOAN_COLUMNS, MEMBER_COLUMNS};

/// A durable store backed by one SQLite connection.
#[derive(Debug)]
pub struct SqliteStore {
    gate: WriterGate,
    conn: Mutex<Connection>,
    lock_timeout: Duration,
}

impl SqliteStore {
    /// Open (creating if needed) the database file at `path` and migrate it.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    /// A private database that disappears when the store is dropped.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(DEFAULT_LOCK_TIMEOUT)?;
        schema::migrate(&conn)?;
        Ok(Self {
            gate: WriterGate::new(),
            conn: Mutex::new(conn),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        })
    }

    /// Bound both the in-process wait and SQLite's busy handler.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> StoreResult<Self> {
        self.conn
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .busy_timeout(timeout)?;
        self.lock_timeout = timeout;
        Ok(self)
    }

    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout
    }
}

impl LendingStore for SqliteStore {
    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn StoreTxn) -> Result<T, E>,
        E: From<StoreError>,
    {
        let started = Instant::now();
        let _pass = self.gate.acquire(self.lock_timeout)?;
        // A panicking closure drops its rusqlite transaction, which rolls back.
        let mut conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|err| {
                if rows::is_busy(&err) {
                    tracing::warn!("sqlite writer lock wait timed out");
                    StoreError::timeout(started.elapsed())
                } else {
                    StoreError::from(err)
                }
            })?;

        let mut txn = SqliteTxn { tx };
        match f(&mut txn) {
            Ok(value) => {
                txn.tx.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = txn.tx.rollback() {
                    tracing::warn!(error = %rollback, "sqlite rollback failed");
                }
                Err(err)
            }
        }
    }
}

struct SqliteTxn<'c> {
    tx: Transaction<'c>,
}

/// Turn "no row changed" into `NotFound`.
fn affected(changed: usize, what: impl FnOnce() -> String) -> StoreResult<()> {
    if changed == 0 {
        Err(StoreError::not_found(what()))
    } else {
        Ok(())
    }
}

impl SqliteTxn<'_> {
    fn last_id(&self) -> StoreResult<u64> {
        u64::try_from(self.tx.last_insert_rowid())
            .map_err(|_| StoreError::corrupt("negative rowid"))
    }
}

impl MemberStore for SqliteTxn<'_> {
    fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_id = ?1");
        Ok(self
            .tx
            .query_row(&sql, params![id.raw()], rows::member)
            .optional()?)
    }

    fn member_by_username(&self, username: &str) -> StoreResult<Option<Member>> {
        let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE username = ?1");
        Ok(self
            .tx
            .query_row(&sql, params![username], rows::member)
            .optional()?)
    }

    fn email_in_use(&self, email: &str) -> StoreResult<bool> {
        Ok(self.tx.query_row(
            "SELECT EXISTS (SELECT 1 FROM members WHERE email = ?1)",
            params![email],
            |row| row.get(0),
        )?)
    }

    fn insert_member(&mut self, member: NewMember) -> StoreResult<MemberId> {
        self.tx.execute(
            "INSERT INTO members
                (username, password_hash, first_name, last_name, email, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                member.username,
                member.password_hash,
                member.first_name,
                member.last_name,
                member.email,
                MemberStatus::Active.as_str(),
                member.created_at,
            ],
        )?;
        Ok(MemberId::new(self.last_id()?))
    }

    fn set_member_status(&mut self, id: MemberId, status: MemberStatus) -> StoreResult<()> {
        let changed = self.tx.execute(
            "UPDATE members SET status = ?2 WHERE member_id = ?1",
            params![id.raw(), status.as_str()],
        )?;
        affected(changed, || format!("member {id}"))
    }

    fn record_login(&mut self, id: MemberId, at: NaiveDateTime) -> StoreResult<()> {
        let changed = self.tx.execute(
            "UPDATE members SET last_login = ?2 WHERE member_id = ?1",
            params![id.raw(), at],
        )?;
        affected(changed, || format!("member {id}"))
    }

    fn list_members(&self) -> StoreResult<Vec<Member>> {
        let sql = format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY created_at DESC, member_id DESC"
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let members = stmt
            .query_map([], rows::member)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    fn admin_by_username(&self, username: &str) -> StoreResult<Option<Administrator>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM administrators WHERE username = ?1");
        Ok(self
            .tx
            .query_row(&sql, params![username], rows::admin)
            .optional()?)
    }

    fn insert_admin(&mut self, admin: NewAdministrator) -> StoreResult<AdminId> {
        self.tx.execute(
            "INSERT INTO administrators (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![admin.username, admin.password_hash, admin.role],
        )?;
        Ok(AdminId::new(self.last_id()?))
    }
}

impl CatalogStore for SqliteTxn<'_> {
    fn get_book(&self, key: &BookKey) -> StoreResult<Option<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn = ?1");
        Ok(self
            .tx
            .query_row(&sql, params![key.as_str()], rows::book)
            .optional()?)
    }

    fn set_availability(
        &mut self,
        key: &BookKey,
        availability: Availability,
    ) -> StoreResult<()> {
        let changed = self.tx.execute(
            "UPDATE books SET availability = ?2 WHERE isbn = ?1",
            params![key.as_str(), availability.as_str()],
        )?;
        affected(changed, || format!("book {key}"))
    }

    fn insert_book(&mut self, book: NewBook) -> StoreResult<()> {
        self.tx.execute(
            "INSERT INTO books (isbn, title, author_id, category_id, availability)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                book.key.as_str(),
                book.title,
                book.author_id.raw(),
                book.category_id.raw(),
                Availability::InStock.as_str(),
            ],
        )?;
        Ok(())
    }

    fn delete_book(&mut self, key: &BookKey) -> StoreResult<()> {
        let changed = self
            .tx
            .execute("DELETE FROM books WHERE isbn = ?1", params![key.as_str()])?;
        affected(changed, || format!("book {key}"))
    }

    fn find_author(&self, name: &str) -> StoreResult<Option<AuthorId>> {
        Ok(self
            .tx
            .query_row(
                "SELECT author_id FROM authors WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .map(AuthorId::new))
    }

    fn insert_author(&mut self, name: &str) -> StoreResult<AuthorId> {
        self.tx
            .execute("INSERT INTO authors (name) VALUES (?1)", params![name])?;
        Ok(AuthorId::new(self.last_id()?))
    }

    fn find_category(&self, name: &str) -> StoreResult<Option<CategoryId>> {
        Ok(self
            .tx
            .query_row(
                "SELECT category_id FROM categories WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?
            .map(CategoryId::new))
    }

    fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let mut stmt = self
            .tx
            .prepare("SELECT category_id, name FROM categories ORDER BY name")?;
        let categories = stmt
            .query_map([], rows::category)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    fn list_books(&self, search: Option<&str>) -> StoreResult<Vec<BookListing>> {
        let mut stmt = self.tx.prepare(
            "SELECT b.isbn, b.title, a.name, c.name, b.availability
             FROM books b
             JOIN authors a ON a.author_id = b.author_id
             JOIN categories c ON c.category_id = b.category_id
             ORDER BY b.title, b.isbn",
        )?;
        let listings = stmt
            .query_map([], rows::listing)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(match search {
            Some(term) => listings.into_iter().filter(|l| l.matches(term)).collect(),
            None => listings,
        })
    }
}

impl Ledger for SqliteTxn<'_> {
    fn insert_loan(&mut self, loan: NewLoan) -> StoreResult<LoanId> {
        self.tx.execute(
            "INSERT INTO loans
                (member_id, isbn, transaction_type, issue_date, due_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                loan.member_id.raw(),
                loan.book_key.as_str(),
                TransactionType::Borrow.as_str(),
                loan.issue_date,
                loan.due_date,
                LoanStatus::Active.as_str(),
            ],
        )?;
        Ok(LoanId::new(self.last_id()?))
    }

    fn find_active_loan(&self, member: MemberId, key: &BookKey) -> StoreResult<Option<Loan>> {
        let sql = format!(
            "SELECT {LOAN_COLUMNS} FROM loans
             WHERE member_id = ?1 AND isbn = ?2 AND status = 'Active'"
        );
        Ok(self
            .tx
            .query_row(&sql, params![member.raw(), key.as_str()], rows::loan)
            .optional()?)
    }

    fn active_loan_for_book(&self, key: &BookKey) -> StoreResult<Option<Loan>> {
        let sql = format!("SELECT {LOAN_COLUMNS} FROM loans WHERE isbn = ?1 AND status = 'Active'");
        Ok(self
            .tx
            .query_row(&sql, params![key.as_str()], rows::loan)
            .optional()?)
    }

    fn count_overdue(&self, member: MemberId, as_of: NaiveDate) -> StoreResult<u64> {
        Ok(self.tx.query_row(
            "SELECT COUNT(*) FROM loans
             WHERE member_id = ?1 AND status = 'Active' AND due_date < ?2",
            params![member.raw(), as_of],
            |row| row.get(0),
        )?)
    }

    fn close_loan(&mut self, id: LoanId, return_date: NaiveDate, fine: Amount) -> StoreResult<()> {
        let changed = self.tx.execute(
            "UPDATE loans
             SET status = ?2, transaction_type = ?3, return_date = ?4, fine = ?5
             WHERE transaction_id = ?1 AND status = 'Active'",
            params![
                id.raw(),
                LoanStatus::Completed.as_str(),
                TransactionType::Return.as_str(),
                return_date,
                fine.units(),
            ],
        )?;
        affected(changed, || format!("active loan {id}"))
    }

    fn list_loans(&self, member: MemberId) -> StoreResult<Vec<LoanRecord>> {
        let sql = format!(
            "SELECT {columns}, COALESCE(b.title, ?2)
             FROM loans l
             LEFT JOIN books b ON b.isbn = l.isbn
             WHERE l.member_id = ?1
             ORDER BY l.issue_date DESC, l.transaction_id DESC",
            columns = qualified_loan_columns(),
        );
        let mut stmt = self.tx.prepare(&sql)?;
        let records = stmt
            .query_map(params![member.raw(), REMOVED_BOOK_TITLE], |row| {
                Ok(LoanRecord {
                    loan: rows::loan(row)?,
                    title: row.get(9)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }
}

/// `LOAN_COLUMNS` prefixed with the `l.` alias, for joins.
fn qualified_loan_columns() -> String {
    LOAN_COLUMNS
        .split(',')
        .map(|column| format!("l.{}", column.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_loan_columns() {
        assert_eq!(
            qualified_loan_columns(),
            "l.transaction_id, l.member_id, l.isbn, l.transaction_type, l.issue_date, \
             l.due_date, l.return_date, l.fine, l.status"
        );
    }

    #[test]
    fn test_open_in_memory_seeds_categories() {
        let store = SqliteStore::open_in_memory().unwrap();

        let categories = store
            .transaction(|txn| txn.list_categories())
            .unwrap();

        assert_eq!(categories.len(), circ_core::DEFAULT_CATEGORIES.len());
        assert!(categories.iter().any(|c| c.name == "DBMS"));
    }
}
