//! Authentication error types.

use carelink_core::error::CarelinkError;
use carelink_core::models::account::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email address is already registered")]
    EmailInUse,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("password must be at least {min_length} characters")]
    WeakPassword { min_length: usize },

    #[error("passwords do not match")]
    PasswordMismatch,

    #[error("role {0} cannot be chosen at registration")]
    RoleNotSelfAssignable(Role),

    #[error("no account for this email")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error("invalid credentials")]
    InvalidCredential,

    #[error("account is blocked")]
    AccountBlocked,

    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl AuthError {
    /// Human-readable text for the sign-in and registration views.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::EmailInUse => "An account with this email already exists.",
            AuthError::InvalidEmail => "Invalid email address.",
            AuthError::WeakPassword { .. } => "Password is too weak.",
            AuthError::PasswordMismatch => "Passwords do not match.",
            AuthError::RoleNotSelfAssignable(_) => "Please select a role.",
            AuthError::UserNotFound => "No account found with this email.",
            AuthError::WrongPassword => "Incorrect password.",
            AuthError::InvalidCredential => "Invalid email or password.",
            AuthError::AccountBlocked => {
                "Your account has been blocked. Please contact the administrator."
            }
            AuthError::Unavailable(_) | AuthError::Crypto(_) => {
                "Something went wrong. Please try again."
            }
        }
    }
}

impl From<CarelinkError> for AuthError {
    fn from(err: CarelinkError) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}

impl From<AuthError> for CarelinkError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailInUse => CarelinkError::AlreadyExists {
                entity: "credential".into(),
            },
            AuthError::InvalidEmail
            | AuthError::WeakPassword { .. }
            | AuthError::PasswordMismatch
            | AuthError::RoleNotSelfAssignable(_) => CarelinkError::Validation {
                message: err.to_string(),
            },
            AuthError::UserNotFound
            | AuthError::WrongPassword
            | AuthError::InvalidCredential
            | AuthError::AccountBlocked => CarelinkError::AuthenticationFailed {
                reason: err.to_string(),
            },
            AuthError::Unavailable(msg) => CarelinkError::Database(msg),
            AuthError::Crypto(msg) => CarelinkError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocked_message_points_to_administrator() {
        assert!(
            AuthError::AccountBlocked
                .user_message()
                .contains("contact the administrator")
        );
    }

    #[test]
    fn store_details_are_not_shown_to_users() {
        let err = AuthError::Unavailable("connection refused on 10.0.0.3".into());
        assert!(!err.user_message().contains("10.0.0.3"));
    }

    #[test]
    fn converts_into_core_error() {
        let core: CarelinkError = AuthError::AccountBlocked.into();
        match core {
            CarelinkError::AuthenticationFailed { reason } => assert!(reason.contains("blocked")),
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }

        let core: CarelinkError = AuthError::WeakPassword { min_length: 6 }.into();
        assert!(matches!(core, CarelinkError::Validation { .. }));
    }
}
