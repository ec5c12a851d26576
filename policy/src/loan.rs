//! Loan period.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Days a book may be kept before it becomes overdue.
pub const DEFAULT_LOAN_PERIOD_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoanPolicy {
    pub loan_period_days: u32,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            loan_period_days: DEFAULT_LOAN_PERIOD_DAYS,
        }
    }
}

impl LoanPolicy {
    pub fn new(loan_period_days: u32) -> Self {
        Self { loan_period_days }
    }

    pub fn validate(&self) -> PolicyResult<()> {
        if self.loan_period_days == 0 {
            return Err(PolicyError::InvalidLoanPeriod {
                days: self.loan_period_days,
            });
        }
        Ok(())
    }

    /// Due date for a loan issued on `issue_date`.
    ///
    /// Saturates at the last representable date.
    pub fn due_date(&self, issue_date: NaiveDate) -> NaiveDate {
        issue_date
            .checked_add_days(Days::new(u64::from(self.loan_period_days)))
            .unwrap_or(NaiveDate::MAX)
    }
}
