//! Row decoding and error classification for the SQLite backend.

use std::error::Error as StdError;
use std::str::FromStr;

use circ_core::{
    Administrator, AdminId, Amount, Book, BookKey, BookListing, Category, CategoryId, Loan,
    LoanId, Member, MemberId, AuthorId,
};
use rusqlite::types::Type;
use rusqlite::{ErrorCode, Row};

use crate::error::{Constraint, StoreError};

pub(crate) const MEMBER_COLUMNS: &str = "member_id, username, password_hash, first_name, \
     last_name, email, status, created_at, last_login";

pub(crate) const ADMIN_COLUMNS: &str = "admin_id, username, password_hash, role";

pub(crate) const BOOK_COLUMNS: &str = "isbn, title, author_id, category_id, availability";

pub(crate) const LOAN_COLUMNS: &str = "transaction_id, member_id, isbn, transaction_type, \
     issue_date, due_date, return_date, fine, status";

/// Read a text column and parse it, reporting parse failures as conversion
/// errors on that column.
fn parsed<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: StdError + Send + Sync + 'static,
{
    let text: String = row.get(idx)?;
    text.parse()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

pub(crate) fn member(row: &Row<'_>) -> rusqlite::Result<Member> {
    Ok(Member {
        id: MemberId::new(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        email: row.get(5)?,
        status: parsed(row, 6)?,
        created_at: row.get(7)?,
        last_login: row.get(8)?,
    })
}

pub(crate) fn admin(row: &Row<'_>) -> rusqlite::Result<Administrator> {
    Ok(Administrator {
        id: AdminId::new(row.get(0)?),
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: row.get(3)?,
    })
}

pub(crate) fn book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        key: parsed::<BookKey>(row, 0)?,
        title: row.get(1)?,
        author_id: AuthorId::new(row.get(2)?),
        category_id: CategoryId::new(row.get(3)?),
        availability: parsed(row, 4)?,
    })
}

/// `isbn, title, author name, category name, availability`.
pub(crate) fn listing(row: &Row<'_>) -> rusqlite::Result<BookListing> {
    Ok(BookListing {
        key: parsed::<BookKey>(row, 0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        category: row.get(3)?,
        availability: parsed(row, 4)?,
    })
}

pub(crate) fn category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: CategoryId::new(row.get(0)?),
        name: row.get(1)?,
    })
}

pub(crate) fn loan(row: &Row<'_>) -> rusqlite::Result<Loan> {
    let fine: Option<u64> = row.get(7)?;
    Ok(Loan {
        id: LoanId::new(row.get(0)?),
        member_id: MemberId::new(row.get(1)?),
        book_key: parsed::<BookKey>(row, 2)?,
        transaction_type: parsed(row, 3)?,
        issue_date: row.get(4)?,
        due_date: row.get(5)?,
        return_date: row.get(6)?,
        fine: fine.map(Amount::new),
        status: parsed(row, 8)?,
    })
}

/// Map a constraint message reported by SQLite onto the rule it names.
fn classify(message: &str) -> Constraint {
    if message.contains("loans.member_id, loans.isbn") {
        Constraint::ActiveLoanPerMemberBook
    } else if message.contains("loans.isbn") {
        Constraint::ActiveLoanPerBook
    } else if message.contains("book on loan") {
        Constraint::BookOnLoan
    } else if message.contains("books.isbn") {
        Constraint::BookKey
    } else if message.contains("members.username") {
        Constraint::MemberUsername
    } else if message.contains("members.email") {
        Constraint::MemberEmail
    } else if message.contains("administrators.username") {
        Constraint::AdminUsername
    } else if message.contains("authors.name") {
        Constraint::AuthorName
    } else if message.contains("FOREIGN KEY") {
        Constraint::ForeignKey
    } else {
        Constraint::Other(message.to_string())
    }
}

pub(crate) fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                let message = message.clone().unwrap_or_else(|| err.to_string());
                StoreError::conflict(classify(&message))
            }
            rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..) => StoreError::corrupt(err.to_string()),
            rusqlite::Error::QueryReturnedNoRows => StoreError::not_found("row"),
            _ if is_busy(&err) => StoreError::unavailable(format!("database busy: {err}")),
            _ => StoreError::unavailable(err.to_string()),
        }
    }
}
