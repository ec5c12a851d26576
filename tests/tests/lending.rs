//! Lending integration tests.
//!
//! These tests run the front desk over the seeded catalog on both backends.

use circ_core::messages;
use circ_tests::prelude::*;

mod round_trip {
    use super::*;

    pub fn scenario(backend: Backend) -> Scenario {
        Scenario::new("round_trip")
            .backend(backend)
            .seed("seeds/catalog.circ")
            .operations("lending/round_trip.circ")
            .step("login", |a| a.output("Logged in as asha (member)"))
            .step("borrow", |a| a.output(messages::MSG_BORROWED))
            .step("holding", |a| a.rows(1).contains("2024-03-15"))
            .step("shelf", |a| a.rows(1).contains("Borrowed"))
            .step("return_on_time", |a| a.output(messages::MSG_RETURNED))
            .step("borrow_again", |a| a.ok())
            .step("return_late", |a| {
                a.output("Book returned with a fine of ₹50. Please pay at the library counter.")
            })
            .step("history", |a| {
                a.rows(2).contains("₹50").contains("Completed").excludes("Active")
            })
    }

    #[test]
    fn test_memory() {
        scenario(Backend::Memory).run().unwrap();
    }

    #[test]
    fn test_sqlite() {
        scenario(Backend::Sqlite).run().unwrap();
    }
}

mod rejections {
    use super::*;

    pub fn scenario(backend: Backend) -> Scenario {
        Scenario::new("rejections")
            .backend(backend)
            .seed("seeds/catalog.circ")
            .operations("lending/rejections.circ")
            .step("login_asha", |a| a.ok())
            .step("unknown_book", |a| a.error(messages::ERR_INVALID_BOOK))
            .step("malformed_key", |a| a.error(messages::ERR_INVALID_BOOK))
            .step("first_borrow", |a| a.output(messages::MSG_BORROWED))
            .step("duplicate", |a| a.error(messages::ERR_DUPLICATE_LOAN))
            .step("someone_else", |a| a.error(messages::ERR_UNAVAILABLE))
            .step("not_holder", |a| a.error(messages::ERR_NO_ACTIVE_LOAN))
            .step("overdue_hold", |a| a.error(messages::ERR_OVERDUE_BLOCK))
            .step("overdue_covers_held_book", |a| {
                a.error(messages::ERR_OVERDUE_BLOCK)
            })
            .step("hold_lifted", |a| {
                a.contains("fine of ₹10").contains(messages::MSG_BORROWED)
            })
            .step("return_twice", |a| a.error(messages::ERR_NO_ACTIVE_LOAN))
            .step("suspended", |a| a.error(messages::ERR_INVALID_CREDENTIALS))
            .step("malformed_return", |a| a.error(messages::ERR_NO_ACTIVE_LOAN))
    }

    #[test]
    fn test_memory() {
        scenario(Backend::Memory).run().unwrap();
    }

    #[test]
    fn test_sqlite() {
        scenario(Backend::Sqlite).run().unwrap();
    }
}
