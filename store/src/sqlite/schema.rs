//! SQLite schema and migration.

use circ_core::DEFAULT_CATEGORIES;
use rusqlite::{params, Connection};

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS authors (
    author_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name      TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS categories (
    category_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS books (
    isbn         TEXT PRIMARY KEY,
    title        TEXT NOT NULL,
    author_id    INTEGER NOT NULL REFERENCES authors(author_id),
    category_id  INTEGER NOT NULL REFERENCES categories(category_id),
    availability TEXT NOT NULL DEFAULT 'In stock'
                 CHECK (availability IN ('In stock', 'Borrowed'))
);

CREATE TABLE IF NOT EXISTS members (
    member_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    status        TEXT NOT NULL DEFAULT 'Active'
                  CHECK (status IN ('Active', 'Suspended', 'Expired')),
    created_at    TEXT NOT NULL,
    last_login    TEXT
);

CREATE TABLE IF NOT EXISTS administrators (
    admin_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'Librarian'
);

-- No foreign key on isbn: completed loans outlive their book.
CREATE TABLE IF NOT EXISTS loans (
    transaction_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    member_id        INTEGER NOT NULL REFERENCES members(member_id),
    isbn             TEXT NOT NULL,
    transaction_type TEXT NOT NULL CHECK (transaction_type IN ('Borrow', 'Return')),
    issue_date       TEXT NOT NULL,
    due_date         TEXT NOT NULL,
    return_date      TEXT,
    fine             INTEGER,
    status           TEXT NOT NULL CHECK (status IN ('Active', 'Completed'))
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_loans_active_book
    ON loans(isbn) WHERE status = 'Active';

CREATE UNIQUE INDEX IF NOT EXISTS idx_loans_active_member_book
    ON loans(member_id, isbn) WHERE status = 'Active';

CREATE INDEX IF NOT EXISTS idx_loans_member ON loans(member_id);

CREATE TRIGGER IF NOT EXISTS books_no_delete_on_loan
BEFORE DELETE ON books
WHEN EXISTS (SELECT 1 FROM loans WHERE isbn = OLD.isbn AND status = 'Active')
BEGIN
    SELECT RAISE(ABORT, 'book on loan');
END;
"#;

/// Create any missing tables, indexes and triggers, and seed the default
/// categories. Idempotent.
pub fn migrate(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    let mut seed = conn.prepare("INSERT OR IGNORE INTO categories (name) VALUES (?1)")?;
    for name in DEFAULT_CATEGORIES {
        seed.execute(params![name])?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}
