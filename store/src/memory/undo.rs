//! Undo log for uncommitted in-memory writes.

use circ_core::{AdminId, Availability, AuthorId, Book, BookKey, LoanId, Loan, Member, MemberId};

use super::tables::Tables;

/// One applied write, with what is needed to reverse it.
#[derive(Debug, Clone)]
pub(crate) enum UndoEntry {
    BookInserted(BookKey),
    BookDeleted(Book),
    AvailabilityChanged {
        key: BookKey,
        previous: Availability,
    },
    AuthorInserted(AuthorId),
    MemberInserted(MemberId),
    /// The member as it was before an update.
    MemberReplaced(Member),
    AdminInserted(AdminId),
    LoanInserted(LoanId),
    /// The loan as it was before an update.
    LoanReplaced(Loan),
}

/// Writes applied by the current transaction, oldest first.
#[derive(Debug, Default)]
pub(crate) struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, entry: UndoEntry) {
        self.entries.push(entry);
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Forget every entry; the writes become permanent.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reverse every recorded write, newest first, and empty the log.
    pub(crate) fn rollback(&mut self, tables: &mut Tables) {
        while let Some(entry) = self.entries.pop() {
            match entry {
                UndoEntry::BookInserted(key) => {
                    tables.remove_book(&key);
                }
                UndoEntry::BookDeleted(book) => {
                    tables.books.insert(book.key.clone(), book);
                }
                UndoEntry::AvailabilityChanged { key, previous } => {
                    if let Some(book) = tables.books.get_mut(&key) {
                        book.availability = previous;
                    }
                }
                UndoEntry::AuthorInserted(id) => tables.remove_author(id),
                UndoEntry::MemberInserted(id) => tables.remove_member(id),
                UndoEntry::MemberReplaced(member) => {
                    tables.replace_member(member);
                }
                UndoEntry::AdminInserted(id) => tables.remove_admin(id),
                UndoEntry::LoanInserted(id) => {
                    tables.remove_loan(id);
                }
                UndoEntry::LoanReplaced(loan) => {
                    tables.replace_loan(loan);
                }
            }
        }
    }
}
