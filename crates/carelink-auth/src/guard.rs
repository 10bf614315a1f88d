//! Role-scoped access decisions.
//!
//! [`decide`] is a pure function from session state to an intent; the
//! shell hosting the views performs the navigation. [`AccessGuard`] binds
//! the decision to a live [`SessionHandle`] and carries out the sign-out
//! a blocked session requires.

use std::sync::Arc;

use carelink_core::models::account::{AccountStatus, Role};
use carelink_core::models::session::SessionState;
use tracing::warn;

use crate::identity::IdentityProvider;
use crate::resolver::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    /// Login page with the "account blocked" indicator.
    BlockedLogin,
    Dashboard(Role),
}

impl RedirectTarget {
    pub fn path(&self) -> String {
        match self {
            RedirectTarget::Login => "/login".to_string(),
            RedirectTarget::BlockedLogin => "/login?blocked=true".to_string(),
            RedirectTarget::Dashboard(role) => role.dashboard_path(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not resolved yet; show a neutral loading state.
    Loading,
    Render,
    Redirect(RedirectTarget),
    /// The principal must be signed out before redirecting.
    SignOutAndRedirect(RedirectTarget),
}

/// Evaluate the access table for a view requiring `required_role`
/// (`None` admits any signed-in principal). First match wins.
pub fn decide(session: &SessionState, required_role: Option<Role>) -> GuardDecision {
    if !session.resolved {
        return GuardDecision::Loading;
    }

    if session.principal.is_none() {
        let target = if session.is_blocked_out() {
            RedirectTarget::BlockedLogin
        } else {
            RedirectTarget::Login
        };
        return GuardDecision::Redirect(target);
    }

    if session.status == Some(AccountStatus::Blocked) {
        return GuardDecision::SignOutAndRedirect(RedirectTarget::BlockedLogin);
    }

    if let Some(required) = required_role
        && session.role != Some(required)
    {
        return match session.role {
            Some(own) => GuardDecision::Redirect(RedirectTarget::Dashboard(own)),
            None => GuardDecision::Redirect(RedirectTarget::Login),
        };
    }

    GuardDecision::Render
}

/// Where to send a principal after sign-in, or from the site root.
pub fn landing(session: &SessionState) -> GuardDecision {
    if !session.resolved {
        return GuardDecision::Loading;
    }
    if session.principal.is_none() {
        return decide(session, None);
    }
    if session.status == Some(AccountStatus::Blocked) {
        return GuardDecision::SignOutAndRedirect(RedirectTarget::BlockedLogin);
    }
    match session.role {
        Some(role) => GuardDecision::Redirect(RedirectTarget::Dashboard(role)),
        // Signed in without a readable account.
        None => GuardDecision::Redirect(RedirectTarget::Login),
    }
}

/// Guard for one role-scoped view.
pub struct AccessGuard<I: IdentityProvider> {
    session: SessionHandle,
    identity: Arc<I>,
    required_role: Option<Role>,
}

impl<I: IdentityProvider> AccessGuard<I> {
    pub fn new(session: SessionHandle, identity: Arc<I>, required_role: Option<Role>) -> Self {
        Self {
            session,
            identity,
            required_role,
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    /// Decision for the current session, without side effects.
    pub fn decision(&self) -> GuardDecision {
        decide(&self.session.current(), self.required_role)
    }

    /// Decide, and complete any required sign-out before returning the
    /// redirect.
    pub async fn evaluate(&self) -> GuardDecision {
        match self.decision() {
            GuardDecision::SignOutAndRedirect(target) => {
                if let Err(e) = self.identity.sign_out().await {
                    warn!(error = %e, "Sign-out before redirect failed");
                }
                GuardDecision::Redirect(target)
            }
            other => other,
        }
    }

    /// Wait for the session to change and re-evaluate. `None` once the
    /// resolver has shut down.
    pub async fn next_decision(&mut self) -> Option<GuardDecision> {
        self.session.changed().await?;
        Some(self.evaluate().await)
    }
}
