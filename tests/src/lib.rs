//! circ scenario test framework
//!
//! Drives the front desk through scripted sessions and checks what it prints.
//!
//! # Structure
//!
//! - **scenarios/seeds/** - Reusable starting states (front desk commands)
//! - **scenarios/*/** - Operations files, commands grouped by step markers
//! - **tests/** - Test orchestration (Rust: seed + operations + assertions)
//!
//! # Example
//!
//! ```ignore
//! use circ_tests::prelude::*;
//!
//! pub fn scenario() -> Scenario {
//!     Scenario::new("round_trip")
//!         .seed("seeds/catalog.circ")
//!         .operations("lending/round_trip.circ")
//!         .step("borrow", |a| a.output("Book borrowed successfully"))
//!         .step("history", |a| a.rows(1))
//! }
//!
//! #[test]
//! fn test() {
//!     scenario().run().unwrap();
//! }
//! ```

mod assertion;
mod error;
mod loader;
mod runner;
mod scenario;

pub use assertion::{table_rows, Assertion, AssertionBuilder, StepOutput};
pub use error::{ScenarioError, ScenarioResult};
pub use loader::Operations;
pub use runner::{ADMIN_PASSWORD, ADMIN_USERNAME};
pub use scenario::{Scenario, Step};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::assertion::{Assertion, AssertionBuilder};
    pub use crate::error::{ScenarioError, ScenarioResult};
    pub use crate::scenario::Scenario;
    pub use circ_repl::Backend;
}
