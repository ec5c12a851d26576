//! Catalog integration tests.

use circ_core::messages;
use circ_store::REMOVED_BOOK_TITLE;
use circ_tests::prelude::*;

mod delete_guard {
    use super::*;

    pub fn scenario(backend: Backend) -> Scenario {
        Scenario::new("delete_guard")
            .backend(backend)
            .seed("seeds/catalog.circ")
            .operations("catalog/delete_guard.circ")
            .step("member_borrows", |a| a.contains(messages::MSG_BORROWED))
            .step("delete_on_loan", |a| a.error(messages::ERR_BOOK_ON_LOAN))
            .step("member_returns", |a| a.contains(messages::MSG_RETURNED))
            .step("delete_after_return", |a| a.contains(messages::MSG_BOOK_DELETED))
            .step("delete_again", |a| a.error("does not exist"))
            .step("catalog_after", |a| a.rows(2).excludes("Database System Concepts"))
            .step("history_outlives_book", |a| a.rows(1).contains(REMOVED_BOOK_TITLE))
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

mod add_book {
    use super::*;

    pub fn scenario(backend: Backend) -> Scenario {
        Scenario::new("add_book")
            .backend(backend)
            .seed("seeds/catalog.circ")
            .operations("catalog/add_book.circ")
            .step("login", |a| a.ok())
            .step("add", |a| a.output(messages::MSG_BOOK_ADDED))
            .step("duplicate", |a| a.error("already in the catalog"))
            .step("bad_key", |a| a.error("invalid book key"))
            .step("unknown_category", |a| a.error("unknown category: Cooking"))
            .step("missing_title", |a| a.error("missing required field: title"))
            .step("search_author", |a| a.rows(2))
            .step("search_category", |a| a.rows(1).contains("Kernighan"))
            .step("categories", |a| {
                a.contains("Software Engineering")
                    .assert_fn(|out| out.lines().count() == 12)
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
