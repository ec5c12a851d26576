//! The lending transaction engine.

use circ_core::{Availability, BookKey, LoanId, LoanRecord, MemberId, NewLoan};
use circ_policy::{FinePolicy, LoanPolicy};
use circ_store::{Constraint, LendingStore, StoreError};

use crate::clock::{Clock, SystemClock};
use crate::error::{LendingError, LendingResult};
use crate::receipt::ReturnReceipt;

/// Borrows and returns books against a [`LendingStore`].
///
/// The engine is the only writer of loan status and book availability. Every
/// operation runs its whole precondition chain inside one store transaction,
/// so the checks see the same state the writes are applied to.
pub struct LendingEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    loans: LoanPolicy,
    fines: FinePolicy,
}

impl<S: LendingStore> LendingEngine<S, SystemClock> {
    /// An engine on the system clock with default policies.
    pub fn with_store(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S: LendingStore, C: Clock> LendingEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            loans: LoanPolicy::default(),
            fines: FinePolicy::default(),
        }
    }

    pub fn with_loan_policy(mut self, policy: LoanPolicy) -> Self {
        self.loans = policy;
        self
    }

    pub fn with_fine_policy(mut self, policy: FinePolicy) -> Self {
        self.fines = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn loan_policy(&self) -> &LoanPolicy {
        &self.loans
    }

    pub fn fine_policy(&self) -> &FinePolicy {
        &self.fines
    }

    /// Lend `book` to `member`.
    ///
    /// Preconditions are checked in a fixed order and the first failure wins:
    /// member active, book exists, no overdue loans, not already held by this
    /// member, not held by anyone else. On success exactly one ledger row is
    /// inserted and the book is marked borrowed. A key that is not a valid
    /// catalog key names no book.
    pub fn borrow(&self, member: MemberId, book: impl AsRef<str>) -> LendingResult<LoanId> {
        let requested = book.as_ref();
        let _span = tracing::info_span!("borrow", %member, book = requested).entered();

        let result = self.store.transaction(|txn| {
            let today = self.clock.today();

            let active_member = txn.get_member(member)?.filter(|m| m.is_active());
            if active_member.is_none() {
                return Err(LendingError::InvalidMember { member });
            }

            let invalid_book = || LendingError::InvalidBook {
                book: requested.to_string(),
            };
            let book = &BookKey::parse(requested).map_err(|_| invalid_book())?;
            let record = txn.get_book(book)?.ok_or_else(invalid_book)?;

            let overdue = txn.count_overdue(member, today)?;
            if overdue > 0 {
                return Err(LendingError::OverdueBlock {
                    member,
                    count: overdue,
                });
            }

            if txn.find_active_loan(member, book)?.is_some() {
                return Err(LendingError::DuplicateLoan {
                    member,
                    book: book.clone(),
                });
            }

            if txn.has_active_loan(book)? || !record.availability.is_in_stock() {
                return Err(LendingError::Unavailable { book: book.clone() });
            }

            let loan_id = txn
                .insert_loan(NewLoan {
                    member_id: member,
                    book_key: book.clone(),
                    issue_date: today,
                    due_date: self.loans.due_date(today),
                })
                .map_err(|err| conflict_to_rejection(err, member, book))?;
            txn.set_availability(book, Availability::Borrowed)?;
            Ok(loan_id)
        });

        match &result {
            Ok(loan) => tracing::info!(%loan, "book borrowed"),
            Err(err) => log_failure(err),
        }
        result
    }

    /// Take `book` back from `member`, charging a fine if it is late.
    pub fn return_book(
        &self,
        member: MemberId,
        book: impl AsRef<str>,
    ) -> LendingResult<ReturnReceipt> {
        let requested = book.as_ref();
        let _span = tracing::info_span!("return", %member, book = requested).entered();

        let result = self.store.transaction(|txn| {
            let today = self.clock.today();

            let no_active_loan = || LendingError::NoActiveLoan {
                member,
                book: requested.to_string(),
            };
            let book = &BookKey::parse(requested).map_err(|_| no_active_loan())?;
            let loan = txn
                .find_active_loan(member, book)?
                .ok_or_else(no_active_loan)?;

            let overdue_days = loan.overdue_days(today);
            let fine = self.fines.fine(overdue_days);
            txn.close_loan(loan.id, today, fine)?;
            txn.set_availability(book, Availability::InStock)?;

            Ok(ReturnReceipt {
                loan_id: loan.id,
                overdue_days,
                fine,
            })
        });

        match &result {
            Ok(receipt) => tracing::info!(
                loan = %receipt.loan_id,
                overdue_days = receipt.overdue_days,
                fine = %receipt.fine,
                "book returned"
            ),
            Err(err) => log_failure(err),
        }
        result
    }

    /// The member's ledger, most recent first.
    pub fn member_loans(&self, member: MemberId) -> LendingResult<Vec<LoanRecord>> {
        self.store.transaction(|txn| Ok(txn.list_loans(member)?))
    }

    /// The member's open loans, most recent first.
    pub fn active_loans(&self, member: MemberId) -> LendingResult<Vec<LoanRecord>> {
        let mut loans = self.member_loans(member)?;
        loans.retain(|record| record.loan.is_active());
        Ok(loans)
    }

    /// Whether any member currently holds `book`.
    pub fn is_on_loan(&self, book: &BookKey) -> LendingResult<bool> {
        self.store.transaction(|txn| Ok(txn.has_active_loan(book)?))
    }
}

/// A storage-level uniqueness failure means a concurrent borrow got there
/// first; report it the way the engine's own check would have.
fn conflict_to_rejection(err: StoreError, member: MemberId, book: &BookKey) -> LendingError {
    match err.constraint() {
        Some(Constraint::ActiveLoanPerMemberBook) => LendingError::DuplicateLoan {
            member,
            book: book.clone(),
        },
        Some(Constraint::ActiveLoanPerBook) => LendingError::Unavailable { book: book.clone() },
        _ => LendingError::StoreUnavailable(err),
    }
}

fn log_failure(err: &LendingError) {
    if err.is_rejection() {
        tracing::debug!(error = %err, "request rejected");
    } else {
        tracing::warn!(error = %err, "store failure, no changes made");
    }
}
