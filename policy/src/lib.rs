//! circ policies
//!
//! Pure, configuration-driven rules consulted by the lending engine:
//! - [`FinePolicy`]: overdue days to a monetary fine
//! - [`LoanPolicy`]: issue date to due date
//!
//! Neither policy performs I/O or keeps hidden state, so the same inputs always
//! produce the same outputs.

mod error;
mod fine;
mod loan;

pub use error::{PolicyError, PolicyResult};
pub use fine::FinePolicy;
pub use loan::LoanPolicy;
