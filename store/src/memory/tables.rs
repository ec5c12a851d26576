//! In-memory tables and the indexes that back the ledger queries.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use circ_core::{
    Administrator, AdminId, Author, AuthorId, Book, BookKey, Category, CategoryId, Loan, LoanId,
    Member, MemberId, NewAdministrator, DEFAULT_CATEGORIES,
};

use crate::error::{Constraint, StoreError, StoreResult};

/// Monotonic id allocation. Ids handed out by a rolled-back transaction are
/// not reused.
#[derive(Debug)]
struct IdAllocator {
    next_member: u64,
    next_admin: u64,
    next_loan: u64,
    next_author: u64,
    next_category: u64,
}

impl IdAllocator {
    fn new() -> Self {
        Self {
            next_member: 1,
            next_admin: 1,
            next_loan: 1,
            next_author: 1,
            next_category: 1,
        }
    }

    fn bump(counter: &mut u64) -> u64 {
        let id = *counter;
        *counter += 1;
        id
    }
}

/// Loan index: which loans belong to a member, and which loan holds a book.
#[derive(Debug, Default)]
pub(crate) struct LoanIndex {
    by_member: HashMap<MemberId, BTreeSet<LoanId>>,
    active_by_book: HashMap<BookKey, LoanId>,
}

impl LoanIndex {
    fn insert(&mut self, loan: &Loan) {
        self.by_member
            .entry(loan.member_id)
            .or_default()
            .insert(loan.id);
        if loan.is_active() {
            self.active_by_book.insert(loan.book_key.clone(), loan.id);
        }
    }

    fn remove(&mut self, loan: &Loan) {
        if let Some(set) = self.by_member.get_mut(&loan.member_id) {
            set.remove(&loan.id);
            if set.is_empty() {
                self.by_member.remove(&loan.member_id);
            }
        }
        if self.active_by_book.get(&loan.book_key) == Some(&loan.id) {
            self.active_by_book.remove(&loan.book_key);
        }
    }

    pub(crate) fn active_for_book(&self, key: &BookKey) -> Option<LoanId> {
        self.active_by_book.get(key).copied()
    }

    pub(crate) fn for_member(&self, member: MemberId) -> impl Iterator<Item = LoanId> + '_ {
        self.by_member
            .get(&member)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }
}

/// All records of one in-memory store.
#[derive(Debug)]
pub(crate) struct Tables {
    pub(crate) books: BTreeMap<BookKey, Book>,
    pub(crate) authors: BTreeMap<AuthorId, Author>,
    author_names: HashMap<String, AuthorId>,
    pub(crate) categories: BTreeMap<CategoryId, Category>,
    category_names: HashMap<String, CategoryId>,
    pub(crate) members: BTreeMap<MemberId, Member>,
    usernames: HashMap<String, MemberId>,
    emails: HashMap<String, MemberId>,
    pub(crate) admins: BTreeMap<AdminId, Administrator>,
    admin_usernames: HashMap<String, AdminId>,
    pub(crate) loans: BTreeMap<LoanId, Loan>,
    pub(crate) loan_index: LoanIndex,
    ids: IdAllocator,
}

impl Tables {
    /// Empty tables with the default categories seeded.
    pub(crate) fn new() -> Self {
        let mut tables = Self {
            books: BTreeMap::new(),
            authors: BTreeMap::new(),
            author_names: HashMap::new(),
            categories: BTreeMap::new(),
            category_names: HashMap::new(),
            members: BTreeMap::new(),
            usernames: HashMap::new(),
            emails: HashMap::new(),
            admins: BTreeMap::new(),
            admin_usernames: HashMap::new(),
            loans: BTreeMap::new(),
            loan_index: LoanIndex::default(),
            ids: IdAllocator::new(),
        };
        for name in DEFAULT_CATEGORIES {
            let id = CategoryId::new(IdAllocator::bump(&mut tables.ids.next_category));
            tables.category_names.insert((*name).to_string(), id);
            tables.categories.insert(
                id,
                Category {
                    id,
                    name: (*name).to_string(),
                },
            );
        }
        tables
    }

    // ==================== Books ====================

    pub(crate) fn insert_book(&mut self, book: Book) -> StoreResult<()> {
        if self.books.contains_key(&book.key) {
            return Err(StoreError::conflict(Constraint::BookKey));
        }
        if !self.authors.contains_key(&book.author_id)
            || !self.categories.contains_key(&book.category_id)
        {
            return Err(StoreError::conflict(Constraint::ForeignKey));
        }
        self.books.insert(book.key.clone(), book);
        Ok(())
    }

    pub(crate) fn remove_book(&mut self, key: &BookKey) -> Option<Book> {
        self.books.remove(key)
    }

    // ==================== Authors ====================

    pub(crate) fn author_by_name(&self, name: &str) -> Option<AuthorId> {
        self.author_names.get(name).copied()
    }

    pub(crate) fn insert_author(&mut self, name: &str) -> StoreResult<AuthorId> {
        if self.author_names.contains_key(name) {
            return Err(StoreError::conflict(Constraint::AuthorName));
        }
        let id = AuthorId::new(IdAllocator::bump(&mut self.ids.next_author));
        self.author_names.insert(name.to_string(), id);
        self.authors.insert(
            id,
            Author {
                id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    pub(crate) fn remove_author(&mut self, id: AuthorId) {
        if let Some(author) = self.authors.remove(&id) {
            self.author_names.remove(&author.name);
        }
    }

    pub(crate) fn category_by_name(&self, name: &str) -> Option<CategoryId> {
        self.category_names.get(name).copied()
    }

    // ==================== Members ====================

    pub(crate) fn member_by_username(&self, username: &str) -> Option<&Member> {
        self.usernames
            .get(username)
            .and_then(|id| self.members.get(id))
    }

    pub(crate) fn email_in_use(&self, email: &str) -> bool {
        self.emails.contains_key(email)
    }

    pub(crate) fn alloc_member_id(&mut self) -> MemberId {
        MemberId::new(IdAllocator::bump(&mut self.ids.next_member))
    }

    pub(crate) fn insert_member(&mut self, member: Member) -> StoreResult<()> {
        if self.usernames.contains_key(&member.username) {
            return Err(StoreError::conflict(Constraint::MemberUsername));
        }
        if self.emails.contains_key(&member.email) {
            return Err(StoreError::conflict(Constraint::MemberEmail));
        }
        self.usernames.insert(member.username.clone(), member.id);
        self.emails.insert(member.email.clone(), member.id);
        self.members.insert(member.id, member);
        Ok(())
    }

    pub(crate) fn remove_member(&mut self, id: MemberId) {
        if let Some(member) = self.members.remove(&id) {
            self.usernames.remove(&member.username);
            self.emails.remove(&member.email);
        }
    }

    /// Swap in a new version of an existing member, returning the old one.
    /// Username and email are immutable after registration.
    pub(crate) fn replace_member(&mut self, member: Member) -> Option<Member> {
        self.members.insert(member.id, member)
    }

    // ==================== Administrators ====================

    pub(crate) fn admin_by_username(&self, username: &str) -> Option<&Administrator> {
        self.admin_usernames
            .get(username)
            .and_then(|id| self.admins.get(id))
    }

    pub(crate) fn insert_admin(&mut self, admin: NewAdministrator) -> StoreResult<AdminId> {
        if self.admin_usernames.contains_key(&admin.username) {
            return Err(StoreError::conflict(Constraint::AdminUsername));
        }
        let id = AdminId::new(IdAllocator::bump(&mut self.ids.next_admin));
        self.admin_usernames.insert(admin.username.clone(), id);
        self.admins.insert(
            id,
            Administrator {
                id,
                username: admin.username,
                password_hash: admin.password_hash,
                role: admin.role,
            },
        );
        Ok(id)
    }

    pub(crate) fn remove_admin(&mut self, id: AdminId) {
        if let Some(admin) = self.admins.remove(&id) {
            self.admin_usernames.remove(&admin.username);
        }
    }

    // ==================== Loans ====================

    pub(crate) fn alloc_loan_id(&mut self) -> LoanId {
        LoanId::new(IdAllocator::bump(&mut self.ids.next_loan))
    }

    /// Insert a loan, enforcing one active loan per book (which also covers
    /// one active loan per member and book).
    pub(crate) fn insert_loan(&mut self, loan: Loan) -> StoreResult<()> {
        if !self.members.contains_key(&loan.member_id) {
            return Err(StoreError::conflict(Constraint::ForeignKey));
        }
        if loan.is_active() {
            if let Some(holder) = self.loan_index.active_for_book(&loan.book_key) {
                let same_member = self
                    .loans
                    .get(&holder)
                    .is_some_and(|held| held.member_id == loan.member_id);
                let constraint = if same_member {
                    Constraint::ActiveLoanPerMemberBook
                } else {
                    Constraint::ActiveLoanPerBook
                };
                return Err(StoreError::conflict(constraint));
            }
        }
        self.loan_index.insert(&loan);
        self.loans.insert(loan.id, loan);
        Ok(())
    }

    pub(crate) fn remove_loan(&mut self, id: LoanId) -> Option<Loan> {
        let loan = self.loans.remove(&id)?;
        self.loan_index.remove(&loan);
        Some(loan)
    }

    /// Swap in a new version of an existing loan, keeping the index in step.
    pub(crate) fn replace_loan(&mut self, loan: Loan) -> Option<Loan> {
        let previous = self.remove_loan(loan.id);
        self.loan_index.insert(&loan);
        self.loans.insert(loan.id, loan);
        previous
    }

    #[cfg(test)]
    pub(crate) fn seed_member(&mut self, username: &str) -> MemberId {
        let id = self.alloc_member_id();
        let member = circ_core::NewMember {
            username: username.to_string(),
            password_hash: String::new(),
            first_name: username.to_string(),
            last_name: "Test".to_string(),
            email: format!("{username}@example.com"),
            created_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(9, 0, 0))
                .unwrap(),
        }
        .into_member(id);
        self.insert_member(member).unwrap();
        id
    }
}
