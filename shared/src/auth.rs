//! Caller identity as resolved by the surrounding auth layer
//!
//! The core never authenticates anyone; it receives a [`Principal`] that is
//! already trusted and only performs role membership checks against it.

use serde::{Deserialize, Serialize};

/// Roles understood by the role gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Manager,
    Admin,
}

/// Authenticated caller with a stable numeric identity and a role set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: u64,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn new(user_id: u64, roles: impl Into<Vec<Role>>) -> Self {
        Self {
            user_id,
            roles: roles.into(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// MANAGER or ADMIN
    pub fn is_elevated(&self) -> bool {
        self.has_role(Role::Manager) || self.has_role(Role::Admin)
    }
}
