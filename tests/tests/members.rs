//! Member account integration tests.

use circ_core::messages;
use circ_tests::prelude::*;

mod accounts {
    use super::*;

    pub fn scenario(backend: Backend) -> Scenario {
        Scenario::new("accounts")
            .backend(backend)
            .seed("seeds/catalog.circ")
            .operations("members/accounts.circ")
            .step("login", |a| a.output("Logged in as admin (administrator)"))
            .step("duplicate_username", |a| a.error("Username already exists"))
            .step("duplicate_email", |a| a.error("Email already exists"))
            .step("bad_email", |a| a.error("invalid email format"))
            .step("register", |a| {
                a.output(format!("{} (m3)", messages::MSG_MEMBER_REGISTERED))
            })
            .step("members", |a| {
                // Newest first; registrations share a timestamp, so by id.
                a.rows(3).assert_fn(|out| {
                    let rows: Vec<&str> = out.lines().skip(2).collect();
                    rows.len() == 3
                        && rows[0].starts_with("m3")
                        && rows[2].starts_with("m1")
                })
            })
            .step("member_forbidden", |a| a.error(messages::ERR_FORBIDDEN))
            .step("borrow_two", |a| a.ok())
            .step("return_one_late", |a| a.contains("fine of ₹30"))
            .step("transactions", |a| {
                a.rows(2)
                    .contains("Asha Rao (asha, m1) Active")
                    .contains("Active borrows: 1")
                    .contains("Overdue: 1")
                    .contains("Total fines: ₹30")
            })
            .step("unknown_member", |a| a.error("member m99 does not exist"))
            .step("expire", |a| a.output("Member m1 is now Expired"))
            .step("expired_login", |a| a.error(messages::ERR_INVALID_CREDENTIALS))
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
