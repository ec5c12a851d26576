//! Policy error types.

use thiserror::Error;

/// Policy configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// Loan period must be at least one day.
    #[error("loan period must be at least 1 day, got {days}")]
    InvalidLoanPeriod { days: u32 },

    /// A fine cap is configured but no daily rate accrues towards it.
    #[error("max fine of {max} configured with a zero daily rate")]
    CapWithoutRate { max: u64 },
}

/// Result type for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;
