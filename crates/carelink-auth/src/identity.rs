//! Identity provider adapter.
//!
//! [`IdentityProvider`] is the boundary to whatever verifies credentials
//! and owns the "current principal". [`LocalIdentityProvider`] is the
//! bundled implementation backed by a [`CredentialRepository`].

use carelink_core::error::CarelinkError;
use carelink_core::models::principal::{CreateCredential, Principal};
use carelink_core::repository::CredentialRepository;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

pub trait IdentityProvider: Send + Sync {
    /// Register new credentials. Does not sign the principal in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;

    /// Check credentials without publishing a session.
    fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send;

    /// Publish `principal` as the current session.
    fn activate(&self, principal: Principal)
    -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Verify credentials and publish the principal.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Principal, AuthError>> + Send {
        async move {
            let principal = self.verify_credentials(email, password).await?;
            self.activate(principal.clone()).await?;
            Ok(principal)
        }
    }

    /// Clear the current principal.
    fn sign_out(&self) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// The principal currently signed in, if any.
    fn current(&self) -> Option<Principal>;

    /// Session-change notifications. The receiver always holds the latest
    /// principal; intermediate changes may be coalesced.
    fn subscribe(&self) -> watch::Receiver<Option<Principal>>;
}

/// Minimal syntactic check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Identity provider backed by the credential store.
pub struct LocalIdentityProvider<R: CredentialRepository> {
    credentials: R,
    config: AuthConfig,
    current: watch::Sender<Option<Principal>>,
}

impl<R: CredentialRepository> LocalIdentityProvider<R> {
    pub fn new(credentials: R, config: AuthConfig) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            credentials,
            config,
            current,
        }
    }
}

impl<R: CredentialRepository> IdentityProvider for LocalIdentityProvider<R> {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(AuthError::WeakPassword {
                min_length: self.config.min_password_length,
            });
        }

        let password_hash = password::hash_password(password, self.config.pepper.as_deref())?;

        let credential = self
            .credentials
            .create(CreateCredential {
                email: email.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                CarelinkError::AlreadyExists { .. } => AuthError::EmailInUse,
                other => other.into(),
            })?;

        info!(principal_id = %credential.principal_id, "Registered credentials");

        Ok(Principal {
            id: credential.principal_id,
            email: credential.email,
            session_token: token::generate_session_token(),
        })
    }

    async fn verify_credentials(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidEmail);
        }

        let credential = self
            .credentials
            .get_by_email(&email)
            .await
            .map_err(|e| match e {
                CarelinkError::NotFound { .. } => AuthError::UserNotFound,
                other => other.into(),
            })?;

        let valid = password::verify_password(
            password,
            &credential.password_hash,
            self.config.pepper.as_deref(),
        )
        .map_err(|e| {
            warn!(principal_id = %credential.principal_id, error = %e, "Stored password hash is unusable");
            AuthError::InvalidCredential
        })?;

        if !valid {
            return Err(AuthError::WrongPassword);
        }

        Ok(Principal {
            id: credential.principal_id,
            email: credential.email,
            session_token: token::generate_session_token(),
        })
    }

    async fn activate(&self, principal: Principal) -> Result<(), AuthError> {
        let token_hash = token::hash_session_token(&principal.session_token);
        self.credentials
            .set_session_token_hash(principal.id, Some(token_hash))
            .await?;

        info!(principal_id = %principal.id, "Principal signed in");
        self.current.send_replace(Some(principal));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(previous) = self.current() else {
            return Ok(());
        };

        // Revoke before notifying; the local session is cleared even if
        // the store write fails.
        if let Err(e) = self
            .credentials
            .set_session_token_hash(previous.id, None)
            .await
        {
            warn!(principal_id = %previous.id, error = %e, "Failed to revoke session token");
        }

        self.current.send_replace(None);
        info!(principal_id = %previous.id, "Principal signed out");
        Ok(())
    }

    fn current(&self) -> Option<Principal> {
        self.current.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Principal>> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.in"));
        assert!(!is_valid_email("asha"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("asha@@example.com"));
        assert!(!is_valid_email("asha @example.com"));
        assert!(!is_valid_email("asha@example.com."));
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Asha@Example.COM "), "asha@example.com");
    }
}
