//! Session domain model.
//!
//! A session is the resolved, in-memory view of who is signed in, with
//! what role and in what standing. It is never persisted.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::{AccountStatus, Role};
use super::principal::Principal;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SessionState {
    pub principal: Option<Principal>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    /// `false` between "principal known" and "account fetched".
    pub resolved: bool,
}

impl SessionState {
    /// Initial state on load, before the identity provider has reported.
    pub fn loading() -> Self {
        Self::default()
    }

    /// Resolved state with nobody signed in.
    pub fn signed_out() -> Self {
        Self {
            resolved: true,
            ..Self::default()
        }
    }

    /// Signed out because the account was found blocked. Kept until the
    /// next principal arrives so the login view can say why.
    pub fn blocked_out() -> Self {
        Self {
            principal: None,
            role: None,
            status: Some(AccountStatus::Blocked),
            resolved: true,
        }
    }

    /// Principal known, account lookup still outstanding.
    pub fn pending(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
            role: None,
            status: None,
            resolved: false,
        }
    }

    pub fn principal_id(&self) -> Option<Uuid> {
        self.principal.as_ref().map(|p| p.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.resolved && self.principal.is_some()
    }

    pub fn is_blocked_out(&self) -> bool {
        self.principal.is_none() && self.status == Some(AccountStatus::Blocked)
    }
}

/// An authenticated, active principal acting in a known role.
///
/// Derived from a resolved session; workflow and admin operations take an
/// actor rather than a raw session so that role checks happen once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub principal_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl Actor {
    /// `None` unless the session is resolved, has a role, and is active.
    pub fn from_session(session: &SessionState) -> Option<Self> {
        if !session.resolved || session.status != Some(AccountStatus::Active) {
            return None;
        }
        let principal = session.principal.as_ref()?;
        Some(Self {
            principal_id: principal.id,
            email: principal.email.clone(),
            role: session.role?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal() -> Principal {
        Principal {
            id: Uuid::new_v4(),
            email: "asha@example.com".into(),
            session_token: "token".into(),
        }
    }

    #[test]
    fn actor_requires_resolved_active_session_with_role() {
        let p = principal();
        let session = SessionState {
            principal: Some(p.clone()),
            role: Some(Role::Nri),
            status: Some(AccountStatus::Active),
            resolved: true,
        };
        let actor = Actor::from_session(&session).unwrap();
        assert_eq!(actor.principal_id, p.id);
        assert_eq!(actor.role, Role::Nri);

        let unresolved = SessionState {
            resolved: false,
            ..session.clone()
        };
        assert!(Actor::from_session(&unresolved).is_none());

        let no_role = SessionState {
            role: None,
            status: None,
            ..session.clone()
        };
        assert!(Actor::from_session(&no_role).is_none());

        let blocked = SessionState {
            status: Some(AccountStatus::Blocked),
            ..session
        };
        assert!(Actor::from_session(&blocked).is_none());
    }

    #[test]
    fn blocked_out_is_resolved_and_anonymous() {
        let state = SessionState::blocked_out();
        assert!(state.resolved);
        assert!(state.is_blocked_out());
        assert!(!state.is_authenticated());
        assert!(!SessionState::signed_out().is_blocked_out());
    }
}
