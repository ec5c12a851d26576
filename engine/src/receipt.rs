//! Return receipts.

use circ_core::{messages, Amount, LoanId};

/// Outcome of a successful return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub loan_id: LoanId,
    /// Whole days past the due date, zero when on time.
    pub overdue_days: u64,
    /// Zero when returned on time or within the grace period.
    pub fine: Amount,
}

impl ReturnReceipt {
    pub fn has_fine(&self) -> bool {
        !self.fine.is_zero()
    }

    /// The confirmation shown to the member.
    pub fn message(&self) -> String {
        if self.has_fine() {
            messages::msg_returned_with_fine(self.fine)
        } else {
            messages::MSG_RETURNED.to_string()
        }
    }
}
