//! Input validation for catalog keys and member contact details.

use std::sync::OnceLock;

use regex_lite::Regex;

/// Exactly 10 or 13 ASCII digits, nothing else.
const BOOK_KEY_PATTERN: &str = r"^(?:[0-9]{10}|[0-9]{13})$";

/// `local@domain.tld` with a TLD of at least two letters.
const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

fn book_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(BOOK_KEY_PATTERN).expect("book key pattern compiles"))
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
}

/// Check whether `raw` is a well-formed book key.
pub fn is_valid_book_key(raw: &str) -> bool {
    book_key_regex().is_match(raw)
}

/// Check whether `raw` is a well-formed email address.
pub fn is_valid_email(raw: &str) -> bool {
    email_regex().is_match(raw)
}
