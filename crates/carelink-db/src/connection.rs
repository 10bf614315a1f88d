//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealAccountRepository, SurrealConnectionRepository, SurrealCredentialRepository,
    SurrealReviewRepository, SurrealServiceRepository, SurrealServiceRequestRepository,
};
use crate::schema::run_migrations;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket URL (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "carelink".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// Manages a connection to SurrealDB and hands out repositories that
/// share it.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB, authenticate as root and select the
    /// configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Successfully connected to SurrealDB");

        Ok(Self { db })
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }

    pub fn credentials(&self) -> SurrealCredentialRepository<Client> {
        SurrealCredentialRepository::new(self.db.clone())
    }

    pub fn accounts(&self) -> SurrealAccountRepository<Client> {
        SurrealAccountRepository::new(self.db.clone())
    }

    pub fn services(&self) -> SurrealServiceRepository<Client> {
        SurrealServiceRepository::new(self.db.clone())
    }

    pub fn connections(&self) -> SurrealConnectionRepository<Client> {
        SurrealConnectionRepository::new(self.db.clone())
    }

    pub fn service_requests(&self) -> SurrealServiceRequestRepository<Client> {
        SurrealServiceRequestRepository::new(self.db.clone())
    }

    pub fn reviews(&self) -> SurrealReviewRepository<Client> {
        SurrealReviewRepository::new(self.db.clone())
    }
}
