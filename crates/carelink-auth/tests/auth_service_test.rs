//! Integration tests for the authentication service.

use std::sync::Arc;

use carelink_auth::config::AuthConfig;
use carelink_auth::error::AuthError;
use carelink_auth::identity::{IdentityProvider, LocalIdentityProvider};
use carelink_auth::service::{AuthService, SignUpInput};
use carelink_auth::token;
use carelink_core::models::account::{AccountStatus, CreateAccount, Role};
use carelink_core::repository::{AccountRepository, CredentialRepository};
use carelink_db::repository::{SurrealAccountRepository, SurrealCredentialRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

type Identity = LocalIdentityProvider<SurrealCredentialRepository<Db>>;
type Service = AuthService<Identity, SurrealAccountRepository<Db>>;

fn test_config() -> AuthConfig {
    AuthConfig {
        pepper: Some("test-pepper".into()),
        min_password_length: 6,
    }
}

/// Spin up in-memory DB, run migrations, wire the service.
async fn setup() -> (Service, Arc<Identity>, Surreal<Db>) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    carelink_db::run_migrations(&db).await.unwrap();

    let identity = Arc::new(LocalIdentityProvider::new(
        SurrealCredentialRepository::new(db.clone()),
        test_config(),
    ));
    let service = AuthService::new(identity.clone(), SurrealAccountRepository::new(db.clone()));
    (service, identity, db)
}

fn sign_up_input(email: &str, role: Role) -> SignUpInput {
    SignUpInput {
        email: email.into(),
        password: "kerala-2024".into(),
        confirm_password: "kerala-2024".into(),
        role,
    }
}

#[tokio::test]
async fn sign_up_creates_account_and_signs_in() {
    let (service, identity, db) = setup().await;

    let out = service
        .sign_up(sign_up_input("Meera@Example.com", Role::Nri))
        .await
        .unwrap();

    assert_eq!(out.principal.email, "meera@example.com");
    assert_eq!(out.account.role, Role::Nri);
    assert_eq!(out.account.status, AccountStatus::Active);
    assert_eq!(identity.current().map(|p| p.id), Some(out.principal.id));

    let credential = SurrealCredentialRepository::new(db)
        .get_by_email("meera@example.com")
        .await
        .unwrap();
    assert_eq!(
        credential.session_token_hash,
        Some(token::hash_session_token(&out.principal.session_token))
    );
    assert_ne!(credential.password_hash, "kerala-2024");
}

#[tokio::test]
async fn sign_up_rejects_admin_role_and_mismatched_passwords() {
    let (service, identity, _db) = setup().await;

    let err = service
        .sign_up(sign_up_input("root@example.com", Role::Admin))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RoleNotSelfAssignable(Role::Admin)));

    let mut input = sign_up_input("ravi@example.com", Role::Caretaker);
    input.confirm_password = "something-else".into();
    let err = service.sign_up(input).await.unwrap_err();
    assert!(matches!(err, AuthError::PasswordMismatch));

    assert!(identity.current().is_none());
}

#[tokio::test]
async fn sign_up_failures_are_typed() {
    let (service, _identity, _db) = setup().await;

    service
        .sign_up(sign_up_input("ravi@example.com", Role::Caretaker))
        .await
        .unwrap();

    let err = service
        .sign_up(sign_up_input("ravi@example.com", Role::Nri))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::EmailInUse));

    let err = service
        .sign_up(sign_up_input("not-an-email", Role::Nri))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidEmail));

    let mut weak = sign_up_input("anu@example.com", Role::Nri);
    weak.password = "abc".into();
    weak.confirm_password = "abc".into();
    let err = service.sign_up(weak).await.unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword { min_length: 6 }));
}

#[tokio::test]
async fn login_success_reports_role() {
    let (service, identity, _db) = setup().await;

    let registered = service
        .sign_up(sign_up_input("ravi@example.com", Role::Caretaker))
        .await
        .unwrap();
    service.logout().await.unwrap();
    assert!(identity.current().is_none());

    let out = service.login("ravi@example.com", "kerala-2024").await.unwrap();
    assert_eq!(out.principal.id, registered.principal.id);
    assert_eq!(out.role, Some(Role::Caretaker));
    assert_eq!(identity.current().map(|p| p.id), Some(out.principal.id));
    // A fresh token is issued on every sign-in.
    assert_ne!(out.principal.session_token, registered.principal.session_token);
}

#[tokio::test]
async fn login_wrong_password_and_unknown_email() {
    let (service, identity, _db) = setup().await;

    service
        .sign_up(sign_up_input("ravi@example.com", Role::Caretaker))
        .await
        .unwrap();
    service.logout().await.unwrap();

    let err = service.login("ravi@example.com", "wrong-password").await.unwrap_err();
    assert!(matches!(err, AuthError::WrongPassword));

    let err = service.login("nobody@example.com", "kerala-2024").await.unwrap_err();
    assert!(matches!(err, AuthError::UserNotFound));

    assert!(identity.current().is_none());
}

#[tokio::test]
async fn blocked_account_cannot_log_in_even_with_correct_password() {
    let (service, identity, db) = setup().await;

    let registered = service
        .sign_up(sign_up_input("ravi@example.com", Role::Caretaker))
        .await
        .unwrap();
    service.logout().await.unwrap();

    SurrealAccountRepository::new(db.clone())
        .set_status(registered.principal.id, AccountStatus::Blocked)
        .await
        .unwrap();

    let mut notifications = identity.subscribe();
    notifications.borrow_and_update();

    let err = service.login("ravi@example.com", "kerala-2024").await.unwrap_err();
    assert!(matches!(err, AuthError::AccountBlocked));
    assert!(err.user_message().contains("blocked"));

    // No transient authenticated state was ever published.
    assert!(identity.current().is_none());
    assert!(!notifications.has_changed().unwrap());

    let credential = SurrealCredentialRepository::new(db)
        .get_by_email("ravi@example.com")
        .await
        .unwrap();
    assert!(credential.session_token_hash.is_none());
}

#[tokio::test]
async fn login_without_account_has_no_role() {
    let (_service, identity, db) = setup().await;

    let principal = identity.sign_up("orphan@example.com", "kerala-2024").await.unwrap();
    let service = AuthService::new(identity.clone(), SurrealAccountRepository::new(db.clone()));

    let out = service.login("orphan@example.com", "kerala-2024").await.unwrap();
    assert_eq!(out.principal.id, principal.id);
    assert_eq!(out.role, None);

    // Account created later is picked up on the next login.
    SurrealAccountRepository::new(db)
        .create(CreateAccount {
            principal_id: principal.id,
            email: "orphan@example.com".into(),
            role: Role::Nri,
            status: None,
        })
        .await
        .unwrap();
    let out = service.login("orphan@example.com", "kerala-2024").await.unwrap();
    assert_eq!(out.role, Some(Role::Nri));
}

#[tokio::test]
async fn logout_revokes_session_token() {
    let (service, identity, db) = setup().await;

    service
        .sign_up(sign_up_input("ravi@example.com", Role::Caretaker))
        .await
        .unwrap();
    service.logout().await.unwrap();
    // Signing out twice is harmless.
    service.logout().await.unwrap();

    assert!(identity.current().is_none());
    let credential = SurrealCredentialRepository::new(db)
        .get_by_email("ravi@example.com")
        .await
        .unwrap();
    assert!(credential.session_token_hash.is_none());
}
