//! Overdue fine computation.

use circ_core::Amount;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, PolicyResult};

/// Maps overdue duration to a fine.
///
/// `billable = overdue_days - grace_days` (floored at zero), then
/// `fine = billable * daily_rate`, clamped to `max_fine` when one is set and
/// never above [`Amount::MAX`].
/// The result is zero for zero overdue days and never decreases as overdue
/// days grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinePolicy {
    /// Charge per billable overdue day.
    pub daily_rate: Amount,
    /// Overdue days forgiven before charging starts.
    pub grace_days: u32,
    /// Upper bound for a single loan's fine.
    pub max_fine: Option<Amount>,
}

impl Default for FinePolicy {
    fn default() -> Self {
        Self {
            daily_rate: Amount::new(10),
            grace_days: 0,
            max_fine: None,
        }
    }
}

impl FinePolicy {
    pub fn new(daily_rate: Amount) -> Self {
        Self {
            daily_rate,
            ..Self::default()
        }
    }

    pub fn with_grace_days(mut self, days: u32) -> Self {
        self.grace_days = days;
        self
    }

    pub fn with_max_fine(mut self, max: Amount) -> Self {
        self.max_fine = Some(max);
        self
    }

    /// Reject configurations that cannot be what the operator meant.
    pub fn validate(&self) -> PolicyResult<()> {
        match self.max_fine {
            Some(max) if self.daily_rate.is_zero() && !max.is_zero() => {
                Err(PolicyError::CapWithoutRate { max: max.units() })
            }
            _ => Ok(()),
        }
    }

    /// The fine owed for a loan returned `overdue_days` after its due date.
    pub fn fine(&self, overdue_days: u64) -> Amount {
        let billable = overdue_days.saturating_sub(u64::from(self.grace_days));
        let raw = self.daily_rate.saturating_mul(billable);
        match self.max_fine {
            Some(max) => raw.min(max),
            None => raw,
        }
    }
}
