//! Identity types for circ records.
//!
//! Numeric identifiers are 64-bit values that are:
//! - Unique within their table
//! - Immutable once assigned
//! - Opaque to external users
//!
//! Books are keyed by their catalog number instead, see [`BookKey`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::validate;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Create a new id from a raw value.
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw value.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Unique identifier for a library member.
    MemberId,
    "m"
);

numeric_id!(
    /// Unique identifier for an administrator account.
    AdminId,
    "a"
);

numeric_id!(
    /// Transaction key of a ledger row.
    LoanId,
    "t"
);

numeric_id!(
    /// Identifier for an author.
    AuthorId,
    "au"
);

numeric_id!(
    /// Identifier for a catalog category.
    CategoryId,
    "c"
);

/// Catalog key of a book: an ISBN-like identifier of exactly 10 or 13 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookKey(String);

impl BookKey {
    /// Parse and validate a book key.
    ///
    /// Surrounding whitespace and hyphens are not accepted; the key must be
    /// exactly 10 or 13 ASCII digits.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        if validate::is_valid_book_key(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(CoreError::invalid_book_key(raw))
        }
    }

    /// The key as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BookKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for BookKey {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<BookKey> for String {
    fn from(key: BookKey) -> Self {
        key.0
    }
}

impl AsRef<str> for BookKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
