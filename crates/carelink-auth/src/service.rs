//! Authentication service: sign-up, login and logout orchestration.

use std::sync::Arc;

use carelink_core::error::CarelinkError;
use carelink_core::models::account::{Account, AccountStatus, CreateAccount, Role};
use carelink_core::models::principal::Principal;
use carelink_core::repository::AccountRepository;
use tracing::{error, info, warn};

use crate::error::AuthError;
use crate::identity::IdentityProvider;

/// Input for the registration flow.
#[derive(Debug)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

/// Successful registration. The principal is signed in.
#[derive(Debug)]
pub struct SignUpOutput {
    pub principal: Principal,
    pub account: Account,
}

/// Successful login.
#[derive(Debug)]
pub struct LoginOutput {
    pub principal: Principal,
    /// `None` when the principal has no account record yet.
    pub role: Option<Role>,
}

/// Authentication service.
///
/// Generic over the identity provider and account repository so that the
/// auth layer has no dependency on the database crate.
pub struct AuthService<I: IdentityProvider, A: AccountRepository> {
    identity: Arc<I>,
    accounts: A,
}

impl<I: IdentityProvider, A: AccountRepository> AuthService<I, A> {
    pub fn new(identity: Arc<I>, accounts: A) -> Self {
        Self { identity, accounts }
    }

    /// Register credentials and an account, then sign the principal in.
    pub async fn sign_up(&self, input: SignUpInput) -> Result<SignUpOutput, AuthError> {
        // 1. Validate the form before touching the identity provider.
        if !input.role.is_self_assignable() {
            return Err(AuthError::RoleNotSelfAssignable(input.role));
        }
        if input.password != input.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }

        // 2. Register credentials.
        let principal = self.identity.sign_up(&input.email, &input.password).await?;

        // 3. Create the account before publishing the session, so the
        //    resolver finds it on its first read.
        let account = self
            .accounts
            .create(CreateAccount {
                principal_id: principal.id,
                email: principal.email.clone(),
                role: input.role,
                status: Some(AccountStatus::Active),
            })
            .await
            .map_err(|e| {
                error!(
                    principal_id = %principal.id,
                    error = %e,
                    "Account creation failed after credentials were registered"
                );
                AuthError::Unavailable(e.to_string())
            })?;

        // 4. Sign in.
        self.identity.activate(principal.clone()).await?;
        info!(principal_id = %principal.id, role = %account.role, "Account registered");

        Ok(SignUpOutput { principal, account })
    }

    /// Verify credentials and sign in, rejecting blocked accounts before a
    /// session is ever published.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutput, AuthError> {
        // 1. Verify credentials.
        let principal = self.identity.verify_credentials(email, password).await?;

        // 2. Check account status.
        let role = match self.accounts.get(principal.id).await {
            Ok(account) if account.status.is_blocked() => {
                warn!(principal_id = %principal.id, "Login rejected for blocked account");
                if self
                    .identity
                    .current()
                    .is_some_and(|current| current.id == principal.id)
                {
                    self.identity.sign_out().await?;
                }
                return Err(AuthError::AccountBlocked);
            }
            Ok(account) => Some(account.role),
            Err(CarelinkError::NotFound { .. }) => None,
            Err(e) => return Err(AuthError::Unavailable(e.to_string())),
        };

        // 3. Publish the session.
        self.identity.activate(principal.clone()).await?;
        info!(principal_id = %principal.id, "Login succeeded");

        Ok(LoginOutput { principal, role })
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.identity.sign_out().await
    }
}
