//! Account domain model.
//!
//! An account is the persisted role/status record of a principal. It is
//! keyed by the principal id, so a principal has at most one account.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Caretaker,
    Nri,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Caretaker, Role::Nri, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Caretaker => "caretaker",
            Role::Nri => "nri",
            Role::Admin => "admin",
        }
    }

    /// Root of the role's own area, e.g. `/nri/dashboard`.
    pub fn dashboard_path(&self) -> String {
        format!("/{}/dashboard", self.as_str())
    }

    /// Whether the role may be chosen at self-service registration.
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, Role::Caretaker | Role::Nri)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account standing. Transitions are binary and reversible, and only an
/// admin may change them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Active,
    Blocked,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Blocked => "blocked",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            AccountStatus::Active => AccountStatus::Blocked,
            AccountStatus::Blocked => AccountStatus::Active,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, AccountStatus::Blocked)
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub principal_id: Uuid,
    pub email: String,
    /// Set once at creation; there is no update path for it.
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub principal_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Defaults to [`AccountStatus::Active`] when `None`.
    pub status: Option<AccountStatus>,
}
