//! SurrealDB implementation of [`CredentialRepository`].
//!
//! Credentials are keyed by principal id. The record stores the Argon2id
//! password hash and the SHA-256 digest of the currently issued session
//! token, never the token itself.

use carelink_core::error::CarelinkResult;
use carelink_core::models::principal::{CreateCredential, Credential};
use carelink_core::repository::CredentialRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct CredentialRow {
    email: String,
    password_hash: String,
    session_token_hash: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CredentialRowWithId {
    record_id: String,
    email: String,
    password_hash: String,
    session_token_hash: Option<String>,
    created_at: DateTime<Utc>,
}

impl CredentialRow {
    fn into_credential(self, principal_id: Uuid) -> Credential {
        Credential {
            principal_id,
            email: self.email,
            password_hash: self.password_hash,
            session_token_hash: self.session_token_hash,
            created_at: self.created_at,
        }
    }
}

impl CredentialRowWithId {
    fn try_into_credential(self) -> Result<Credential, DbError> {
        Ok(Credential {
            principal_id: parse_uuid(&self.record_id, "credential")?,
            email: self.email,
            password_hash: self.password_hash,
            session_token_hash: self.session_token_hash,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Credential repository.
#[derive(Clone)]
pub struct SurrealCredentialRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCredentialRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CredentialRepository for SurrealCredentialRepository<C> {
    async fn create(&self, input: CreateCredential) -> CarelinkResult<Credential> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('credential', $id) SET \
                 email = $email, password_hash = $password_hash, \
                 session_token_hash = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "credential"))?;

        let rows: Vec<CredentialRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("credential", &id_str))?;

        Ok(row.into_credential(id))
    }

    async fn get_by_email(&self, email: &str) -> CarelinkResult<Credential> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM credential \
                 WHERE email = $email",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CredentialRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("credential", format!("email={email}")))?;

        Ok(row.try_into_credential()?)
    }

    async fn set_session_token_hash(
        &self,
        principal_id: Uuid,
        token_hash: Option<String>,
    ) -> CarelinkResult<()> {
        self.db
            .query(
                "UPDATE type::record('credential', $id) SET \
                 session_token_hash = $token_hash",
            )
            .bind(("id", principal_id.to_string()))
            .bind(("token_hash", token_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "credential"))?;

        Ok(())
    }
}
