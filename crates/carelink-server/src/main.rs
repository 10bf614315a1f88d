//! CareLink Server — application entry point.

mod config;
mod error;

use std::sync::Arc;

use carelink_auth::{AuthError, IdentityProvider, LocalIdentityProvider, SessionResolver};
use carelink_core::models::account::{AccountStatus, CreateAccount, Role};
use carelink_core::repository::AccountRepository;
use carelink_db::DbManager;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AdminBootstrap, ServerConfig};
use crate::error::ServerError;

/// Create the first admin account unless one already exists.
async fn bootstrap_admin<I, A>(
    identity: &I,
    accounts: &A,
    admin: &AdminBootstrap,
) -> Result<(), ServerError>
where
    I: IdentityProvider,
    A: AccountRepository,
{
    if accounts.count_by_role(Role::Admin).await? > 0 {
        return Ok(());
    }

    let principal = match identity.sign_up(&admin.email, &admin.password).await {
        Ok(principal) => principal,
        Err(AuthError::EmailInUse) => {
            warn!("Admin email already has credentials but no admin account; skipping bootstrap");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    accounts
        .create(CreateAccount {
            principal_id: principal.id,
            email: principal.email,
            role: Role::Admin,
            status: Some(AccountStatus::Active),
        })
        .await?;

    info!(principal_id = %principal.id, "Bootstrapped admin account");
    Ok(())
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    let db = DbManager::connect(&config.db).await?;
    db.migrate().await?;

    let identity = Arc::new(LocalIdentityProvider::new(
        db.credentials(),
        config.auth.clone(),
    ));

    if let Some(admin) = &config.admin {
        bootstrap_admin(identity.as_ref(), &db.accounts(), admin).await?;
    }

    let resolver = Arc::new(SessionResolver::new(
        identity.clone(),
        db.accounts(),
        config.resolver.clone(),
    ));
    let resolver_task = tokio::spawn(resolver.clone().run());

    info!(
        refresh_interval_secs = config.resolver.refresh_interval.map(|d| d.as_secs()),
        "CareLink server ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    identity.sign_out().await?;
    resolver_task.abort();
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carelink=info")),
        )
        .json()
        .init();

    info!("Starting CareLink server...");

    if let Err(e) = run().await {
        error!(error = %e, "CareLink server failed");
        std::process::exit(1);
    }

    info!("CareLink server stopped.");
}
