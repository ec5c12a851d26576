//! Record structures for circ.
//!
//! Books and members are the two catalogued record types; loans are the rows of
//! the transaction ledger that tie them together.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Amount, AdminId, AuthorId, BookKey, CategoryId, CoreError, LoanId, MemberId};

/// Categories every fresh catalog starts with.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Fiction",
    "Non-Fiction",
    "Science",
    "Technology",
    "Chemistry",
    "Physics",
    "Mechanics and Mechanical",
    "DBMS",
    "Programming",
    "Software Engineering",
    "Mathematics",
    "Other",
];

/// Implements `as_str`, `Display` and `FromStr` for a status enum stored as text.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// The stored text form.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::unknown_status($kind, other)),
                }
            }
        }
    };
}

/// Whether a single-copy title is on the shelf.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    InStock,
    Borrowed,
}

text_enum!(Availability, "availability", {
    InStock => "In stock",
    Borrowed => "Borrowed",
});

impl Availability {
    pub fn is_in_stock(&self) -> bool {
        matches!(self, Availability::InStock)
    }
}

/// Membership standing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    #[default]
    Active,
    Suspended,
    Expired,
}

text_enum!(MemberStatus, "member", {
    Active => "Active",
    Suspended => "Suspended",
    Expired => "Expired",
});

/// Lifecycle state of a loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    Active,
    Completed,
}

text_enum!(LoanStatus, "loan", {
    Active => "Active",
    Completed => "Completed",
});

/// The last event applied to a loan: `Borrow` while open, `Return` once closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Borrow,
    Return,
}

text_enum!(TransactionType, "transaction type", {
    Borrow => "Borrow",
    Return => "Return",
});

/// A catalogued book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub key: BookKey,
    pub title: String,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
    pub availability: Availability,
}

/// A book about to be added to the catalog. New books are always in stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub key: BookKey,
    pub title: String,
    pub author_id: AuthorId,
    pub category_id: CategoryId,
}

impl NewBook {
    /// Materialize the stored record.
    pub fn into_book(self) -> Book {
        Book {
            key: self.key,
            title: self.title,
            author_id: self.author_id,
            category_id: self.category_id,
            availability: Availability::InStock,
        }
    }
}

/// A book joined with its author and category names, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListing {
    pub key: BookKey,
    pub title: String,
    pub author: String,
    pub category: String,
    pub availability: Availability,
}

impl BookListing {
    /// Case-insensitive substring match over title, author and category.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [&self.title, &self.author, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub username: String,
    /// Hex-encoded credential hash. Never serialized.
    #[serde(skip)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub status: MemberStatus,
    pub created_at: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

impl Member {
    /// "First Last".
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Only active members may borrow or log in.
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// A member about to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: NaiveDateTime,
}

impl NewMember {
    /// Materialize the stored record under `id`. New members start active.
    pub fn into_member(self, id: MemberId) -> Member {
        Member {
            id,
            username: self.username,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            status: MemberStatus::Active,
            created_at: self.created_at,
            last_login: None,
        }
    }
}

/// Default role for administrator accounts.
pub const DEFAULT_ADMIN_ROLE: &str = "Librarian";

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrator {
    pub id: AdminId,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAdministrator {
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

/// One borrow-to-return lifecycle of a book by a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub member_id: MemberId,
    pub book_key: BookKey,
    pub transaction_type: TransactionType,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine: Option<Amount>,
    pub status: LoanStatus,
}

impl Loan {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Still open and past its due date on `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_active() && self.due_date < today
    }

    /// Whole days between the due date and `on`, zero if not yet due.
    pub fn overdue_days(&self, on: NaiveDate) -> u64 {
        u64::try_from((on - self.due_date).num_days()).unwrap_or(0)
    }

    /// Close the loan: `Completed` with the return date and fine filled in.
    pub fn close(&mut self, return_date: NaiveDate, fine: Amount) {
        self.status = LoanStatus::Completed;
        self.transaction_type = TransactionType::Return;
        self.return_date = Some(return_date);
        self.fine = Some(fine);
    }
}

/// A loan about to be opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub member_id: MemberId,
    pub book_key: BookKey,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
}

impl NewLoan {
    /// Materialize the ledger row under `id`, in status `Active`.
    pub fn into_loan(self, id: LoanId) -> Loan {
        Loan {
            id,
            member_id: self.member_id,
            book_key: self.book_key,
            transaction_type: TransactionType::Borrow,
            issue_date: self.issue_date,
            due_date: self.due_date,
            return_date: None,
            fine: None,
            status: LoanStatus::Active,
        }
    }
}

/// A loan joined with its book title, for transaction listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    #[serde(flatten)]
    pub loan: Loan,
    pub title: String,
}
