//! Role-checked operations over the catalog, accounts and the lending engine.

use circ_core::{
    validate, AdminId, Amount, BookKey, BookListing, Category, CoreError, LoanId, LoanRecord,
    Member, MemberId, MemberStatus, NewAdministrator, NewBook, NewMember, DEFAULT_ADMIN_ROLE,
};
use circ_engine::{Clock, LendingEngine, ReturnReceipt};
use circ_store::{Constraint, LendingStore, StoreError};

use crate::auth::{hash_password, verify_password};
use crate::error::{SessionError, SessionResult};
use crate::session::Session;

/// A book as entered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub category: String,
}

/// A new member as entered by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Summary figures over one member's ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStats {
    pub active_borrows: usize,
    pub total_fines: Amount,
    pub overdue: usize,
}

impl TransactionStats {
    fn collect(records: &[LoanRecord], today: chrono::NaiveDate) -> Self {
        Self {
            active_borrows: records.iter().filter(|r| r.loan.is_active()).count(),
            total_fines: records.iter().filter_map(|r| r.loan.fine).sum(),
            overdue: records.iter().filter(|r| r.loan.is_overdue(today)).count(),
        }
    }
}

/// One member's ledger as shown to administrators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberTransactions {
    pub member: Member,
    pub records: Vec<LoanRecord>,
    pub stats: TransactionStats,
}

fn required(value: &str, field: &'static str) -> SessionResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::missing_field(field).into());
    }
    Ok(trimmed.to_string())
}

fn require_member(session: &Session, action: &'static str) -> SessionResult<MemberId> {
    session
        .member_id()
        .ok_or_else(|| SessionError::forbidden(action))
}

fn require_admin(session: &Session, action: &'static str) -> SessionResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(SessionError::forbidden(action))
    }
}

/// The library as front ends see it.
pub struct Library<S, C> {
    engine: LendingEngine<S, C>,
}

impl<S: LendingStore, C: Clock> Library<S, C> {
    pub fn new(engine: LendingEngine<S, C>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &LendingEngine<S, C> {
        &self.engine
    }

    fn store(&self) -> &S {
        self.engine.store()
    }

    // ==================== Authentication ====================

    /// Log a member in. Suspended and expired accounts are refused with the
    /// same error as a wrong password.
    pub fn login_member(&self, username: &str, password: &str) -> SessionResult<Session> {
        let now = self.engine.clock().now();
        let session = self.store().transaction(|txn| {
            let member = txn
                .member_by_username(username)?
                .filter(|m| verify_password(password, &m.password_hash) && m.is_active())
                .ok_or(SessionError::InvalidCredentials)?;
            txn.record_login(member.id, now)?;
            Ok::<_, SessionError>(Session::member(member.username, member.id))
        });
        match &session {
            Ok(s) => tracing::info!(username, role = %s.role, "login"),
            Err(_) => tracing::debug!(username, "member login refused"),
        }
        session
    }

    pub fn login_admin(&self, username: &str, password: &str) -> SessionResult<Session> {
        let session = self.store().transaction(|txn| {
            let admin = txn
                .admin_by_username(username)?
                .filter(|a| verify_password(password, &a.password_hash))
                .ok_or(SessionError::InvalidCredentials)?;
            Ok::<_, SessionError>(Session::admin(admin.username, admin.id))
        });
        match &session {
            Ok(s) => tracing::info!(username, role = %s.role, "login"),
            Err(_) => tracing::debug!(username, "administrator login refused"),
        }
        session
    }

    /// Bootstrap an administrator account. Not role-checked: only the
    /// operator's command line reaches this.
    pub fn create_admin(
        &self,
        username: &str,
        password: &str,
        role: Option<&str>,
    ) -> SessionResult<AdminId> {
        let username = required(username, "username")?;
        let password = required(password, "password")?;
        let role = role.map_or(Ok(DEFAULT_ADMIN_ROLE.to_string()), |r| required(r, "role"))?;
        let id = self
            .store()
            .transaction(|txn| {
                txn.insert_admin(NewAdministrator {
                    username: username.clone(),
                    password_hash: hash_password(&password),
                    role,
                })
            })
            .map_err(|err| match err.constraint() {
                Some(Constraint::AdminUsername) => SessionError::UsernameTaken {
                    username: username.clone(),
                },
                _ => err.into(),
            })?;
        tracing::info!(%id, username = %username, "administrator created");
        Ok(id)
    }

    // ==================== Catalog ====================

    /// Books with author and category, optionally filtered. Any role.
    pub fn books(&self, _session: &Session, search: Option<&str>) -> SessionResult<Vec<BookListing>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.store().transaction(|txn| txn.list_books(search))?)
    }

    pub fn categories(&self) -> SessionResult<Vec<Category>> {
        Ok(self.store().transaction(|txn| txn.list_categories())?)
    }

    /// Add a book. The author is created on first use; the category must
    /// already exist.
    pub fn add_book(&self, session: &Session, form: BookForm) -> SessionResult<BookKey> {
        require_admin(session, "adding books")?;
        let key = BookKey::parse(form.isbn.trim())?;
        let title = required(&form.title, "title")?;
        let author = required(&form.author, "author")?;
        let category = required(&form.category, "category")?;

        self.store().transaction(|txn| {
            if txn.get_book(&key)?.is_some() {
                return Err(SessionError::DuplicateBook { key: key.clone() });
            }
            let category_id = txn
                .find_category(&category)?
                .ok_or_else(|| SessionError::UnknownCategory {
                    name: category.clone(),
                })?;
            let author_id = match txn.find_author(&author)? {
                Some(id) => id,
                None => txn.insert_author(&author)?,
            };
            txn.insert_book(NewBook {
                key: key.clone(),
                title: title.clone(),
                author_id,
                category_id,
            })
            .map_err(|err| match err.constraint() {
                Some(Constraint::BookKey) => SessionError::DuplicateBook { key: key.clone() },
                _ => err.into(),
            })
        })?;
        tracing::info!(book = %key, title = %title, "book added");
        Ok(key)
    }

    /// Remove a book that nobody currently holds.
    pub fn delete_book(&self, session: &Session, isbn: &str) -> SessionResult<()> {
        require_admin(session, "deleting books")?;
        let key = BookKey::parse(isbn.trim())?;

        self.store().transaction(|txn| {
            if txn.get_book(&key)?.is_none() {
                return Err(SessionError::UnknownBook { key: key.clone() });
            }
            if txn.has_active_loan(&key)? {
                return Err(SessionError::BookOnLoan { key: key.clone() });
            }
            txn.delete_book(&key).map_err(|err| match err {
                StoreError::Conflict {
                    constraint: Constraint::BookOnLoan,
                } => SessionError::BookOnLoan { key: key.clone() },
                StoreError::NotFound { .. } => SessionError::UnknownBook { key: key.clone() },
                other => other.into(),
            })
        })?;
        tracing::info!(book = %key, "book deleted");
        Ok(())
    }

    // ==================== Members ====================

    /// Register a member. Every field is required, the email must be well
    /// formed, and username and email must both be unused.
    pub fn register_member(
        &self,
        session: &Session,
        form: RegistrationForm,
    ) -> SessionResult<MemberId> {
        require_admin(session, "registering members")?;
        let username = required(&form.username, "username")?;
        let password = required(&form.password, "password")?;
        let first_name = required(&form.first_name, "first name")?;
        let last_name = required(&form.last_name, "last name")?;
        let email = required(&form.email, "email")?;
        if !validate::is_valid_email(&email) {
            return Err(CoreError::invalid_email(email).into());
        }
        let created_at = self.engine.clock().now();

        let id = self.store().transaction(|txn| {
            if txn.member_by_username(&username)?.is_some() {
                return Err(SessionError::UsernameTaken {
                    username: username.clone(),
                });
            }
            if txn.email_in_use(&email)? {
                return Err(SessionError::EmailTaken {
                    email: email.clone(),
                });
            }
            txn.insert_member(NewMember {
                username: username.clone(),
                password_hash: hash_password(&password),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                created_at,
            })
            .map_err(|err| match err.constraint() {
                Some(Constraint::MemberUsername) => SessionError::UsernameTaken {
                    username: username.clone(),
                },
                Some(Constraint::MemberEmail) => SessionError::EmailTaken {
                    email: email.clone(),
                },
                _ => err.into(),
            })
        })?;
        tracing::info!(member = %id, username = %username, "member registered");
        Ok(id)
    }

    /// Members, newest registration first.
    pub fn members(&self, session: &Session) -> SessionResult<Vec<Member>> {
        require_admin(session, "listing members")?;
        Ok(self.store().transaction(|txn| txn.list_members())?)
    }

    pub fn set_member_status(
        &self,
        session: &Session,
        member: MemberId,
        status: MemberStatus,
    ) -> SessionResult<()> {
        require_admin(session, "changing member status")?;
        self.store()
            .transaction(|txn| txn.set_member_status(member, status))
            .map_err(|err| match err {
                StoreError::NotFound { .. } => SessionError::UnknownMember { id: member },
                other => other.into(),
            })?;
        tracing::info!(%member, %status, "member status changed");
        Ok(())
    }

    /// A member's ledger with summary figures.
    pub fn member_transactions(
        &self,
        session: &Session,
        member: MemberId,
    ) -> SessionResult<MemberTransactions> {
        require_admin(session, "viewing member transactions")?;
        let (member, records, today) = self.store().transaction(|txn| {
            let found = txn
                .get_member(member)?
                .ok_or(SessionError::UnknownMember { id: member })?;
            let records = txn.list_loans(member)?;
            Ok::<_, SessionError>((found, records, self.engine.clock().today()))
        })?;
        let stats = TransactionStats::collect(&records, today);
        Ok(MemberTransactions {
            member,
            records,
            stats,
        })
    }

    // ==================== Lending ====================

    pub fn borrow(&self, session: &Session, isbn: &str) -> SessionResult<LoanId> {
        let member = require_member(session, "borrowing")?;
        Ok(self.engine.borrow(member, isbn.trim())?)
    }

    pub fn return_book(&self, session: &Session, isbn: &str) -> SessionResult<ReturnReceipt> {
        let member = require_member(session, "returning")?;
        Ok(self.engine.return_book(member, isbn.trim())?)
    }

    /// The member's own ledger, most recent first.
    pub fn history(&self, session: &Session) -> SessionResult<Vec<LoanRecord>> {
        let member = require_member(session, "viewing loan history")?;
        Ok(self.engine.member_loans(member)?)
    }

    /// The member's open loans, for picking what to return.
    pub fn active_loans(&self, session: &Session) -> SessionResult<Vec<LoanRecord>> {
        let member = require_member(session, "viewing loans")?;
        Ok(self.engine.active_loans(member)?)
    }
}
