//! Output formatting utilities for the REPL.

use circ_core::{BookListing, Category, LoanRecord, Member};
use circ_session::MemberTransactions;

/// A plain-text table with columns padded to their widest cell.
struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let mut out = vec![pad_line(&self.headers, &widths), pad_line(&rule, &widths)];
        for row in &self.rows {
            out.push(pad_line(row, &widths));
        }
        out.join("\n")
    }
}

fn pad_line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref()))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

pub fn format_books(books: &[BookListing]) -> String {
    if books.is_empty() {
        return "No books found".to_string();
    }
    let mut table = Table::new(vec!["ISBN", "Title", "Author", "Category", "Status"]);
    for book in books {
        table.row(vec![
            book.key.to_string(),
            book.title.clone(),
            book.author.clone(),
            book.category.clone(),
            book.availability.to_string(),
        ]);
    }
    table.render()
}

pub fn format_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_loans(records: &[LoanRecord]) -> String {
    if records.is_empty() {
        return "No transactions".to_string();
    }
    let mut table = Table::new(vec![
        "Txn", "ISBN", "Title", "Issued", "Due", "Returned", "Fine", "Status",
    ]);
    for record in records {
        let loan = &record.loan;
        table.row(vec![
            loan.id.to_string(),
            loan.book_key.to_string(),
            record.title.clone(),
            loan.issue_date.to_string(),
            loan.due_date.to_string(),
            or_dash(loan.return_date),
            or_dash(loan.fine),
            loan.status.to_string(),
        ]);
    }
    table.render()
}

pub fn format_members(members: &[Member]) -> String {
    if members.is_empty() {
        return "No members registered".to_string();
    }
    let mut table = Table::new(vec![
        "ID", "Username", "Name", "Email", "Status", "Registered", "Last login",
    ]);
    for member in members {
        table.row(vec![
            member.id.to_string(),
            member.username.clone(),
            member.display_name(),
            member.email.clone(),
            member.status.to_string(),
            member.created_at.format("%Y-%m-%d %H:%M").to_string(),
            or_dash(
                member
                    .last_login
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            ),
        ]);
    }
    table.render()
}

pub fn format_transactions(view: &MemberTransactions) -> String {
    let member = &view.member;
    let stats = &view.stats;
    format!(
        "{} ({}, {}) {}\nActive borrows: {}  Overdue: {}  Total fines: {}\n{}",
        member.display_name(),
        member.username,
        member.id,
        member.status,
        stats.active_borrows,
        stats.overdue,
        stats.total_fines,
        format_loans(&view.records)
    )
}

/// Help text listing every command.
pub fn help_text() -> String {
    [
        "Session:",
        "  login <username> <password> [--admin]   Log in as a member or administrator",
        "  logout                                   End the session",
        "  whoami                                   Show who is logged in",
        "",
        "Members:",
        "  books [search]                           List books, optionally filtered",
        "  borrow <isbn>                            Borrow a book",
        "  return <isbn>                            Return a borrowed book",
        "  loans                                    Books you currently hold",
        "  history                                  Your transaction history",
        "",
        "Administrators:",
        "  books [search]                           List books, optionally filtered",
        "  categories                               List categories",
        "  add-book <isbn> <title> <author> <category>",
        "  delete-book <isbn>",
        "  register <username> <password> <first> <last> <email>",
        "  members                                  List members, newest first",
        "  set-status <member> <Active|Suspended|Expired>",
        "  transactions <member>                    A member's ledger and totals",
        "",
        "  help                                     Show this help",
        "  quit                                     Exit",
        "",
        "Quote arguments that contain spaces: add-book 1111111111 \"Malgudi Days\" \"R. K. Narayan\" Fiction",
    ]
    .join("\n")
}

/// Print help information.
pub fn print_help() {
    println!("{}", help_text());
}
