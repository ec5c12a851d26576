//! Monetary amounts.
//!
//! Fines are recorded in whole currency units. Amounts never go negative.

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Currency symbol used when rendering amounts.
pub const CURRENCY_SYMBOL: &str = "₹";

/// A non-negative amount of money in whole currency units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(0);

    /// The largest amount a ledger row can record (a signed 64-bit column).
    pub const MAX: Amount = Amount(i64::MAX as u64);

    pub fn new(units: u64) -> Self {
        Self(units)
    }

    /// Get the raw number of units.
    pub fn units(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply by a count, clamping at [`Amount::MAX`].
    pub fn saturating_mul(self, count: u64) -> Self {
        Self(self.0.saturating_mul(count)).min(Self::MAX)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0.saturating_add(rhs.0)).min(Self::MAX)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CURRENCY_SYMBOL, self.0)
    }
}
