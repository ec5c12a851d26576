//! User-facing messages shared by the lending engine, the session layer and
//! the REPL.
//!
//! These constants are part of the interface: front ends match on failure
//! kinds and print these strings verbatim, so their wording must stay stable.

/// Borrow rejected: member unknown or not active.
pub const ERR_INVALID_MEMBER: &str = "Member account is not active or does not exist";

/// Borrow rejected: no such book.
pub const ERR_INVALID_BOOK: &str = "Book does not exist in the catalog";

/// Borrow rejected: member holds an overdue loan.
pub const ERR_OVERDUE_BLOCK: &str = "Cannot borrow new books while you have overdue items";

/// Borrow rejected: member already holds this book.
pub const ERR_DUPLICATE_LOAN: &str = "You already have this book borrowed";

/// Borrow rejected: someone else holds this book.
pub const ERR_UNAVAILABLE: &str = "Book is currently borrowed by another member";

/// Return rejected: nothing to return.
pub const ERR_NO_ACTIVE_LOAN: &str = "No active loan found for this book";

/// Persistence layer unreachable or timed out.
pub const ERR_STORE_UNAVAILABLE: &str =
    "The library database is unavailable; no changes were made, please try again";

/// Login rejected.
pub const ERR_INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Action requires a different role.
pub const ERR_FORBIDDEN: &str = "This action is not permitted for your role";

/// Catalog delete rejected: book on loan.
pub const ERR_BOOK_ON_LOAN: &str = "Cannot delete a book that is currently on loan";

/// Book added.
pub const MSG_BOOK_ADDED: &str = "Book added successfully";

/// Book deleted.
pub const MSG_BOOK_DELETED: &str = "Book deleted successfully";

/// Borrow succeeded.
pub const MSG_BORROWED: &str = "Book borrowed successfully";

/// Return succeeded without a fine.
pub const MSG_RETURNED: &str = "Book returned successfully";

/// Member registered.
pub const MSG_MEMBER_REGISTERED: &str = "Member registered successfully";

/// Return succeeded with a fine to collect.
pub fn msg_returned_with_fine(fine: crate::Amount) -> String {
    format!("Book returned with a fine of {fine}. Please pay at the library counter.")
}
