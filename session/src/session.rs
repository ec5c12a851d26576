//! Who is acting.

use std::fmt;

use circ_core::{AdminId, MemberId};

/// The authenticated principal behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Member(MemberId),
    Admin(AdminId),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Member(_) => f.write_str("member"),
            Role::Admin(_) => f.write_str("administrator"),
        }
    }
}

/// A logged-in user. Passed explicitly into every [`crate::Library`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

impl Session {
    pub fn member(username: impl Into<String>, id: MemberId) -> Self {
        Self {
            username: username.into(),
            role: Role::Member(id),
        }
    }

    pub fn admin(username: impl Into<String>, id: AdminId) -> Self {
        Self {
            username: username.into(),
            role: Role::Admin(id),
        }
    }

    pub fn member_id(&self) -> Option<MemberId> {
        match self.role {
            Role::Member(id) => Some(id),
            Role::Admin(_) => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin(_))
    }
}
