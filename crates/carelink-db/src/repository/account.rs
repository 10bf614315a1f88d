//! SurrealDB implementation of [`AccountRepository`].
//!
//! Accounts are stored under the principal id as record id, which gives
//! the one-account-per-principal invariant for free. Older records may
//! lack a `status` field; the row decoder in this module is the single
//! place where that is read as `active`.

use carelink_core::error::CarelinkResult;
use carelink_core::models::account::{Account, AccountStatus, CreateAccount, Role};
use carelink_core::repository::{AccountRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    email: String,
    role: String,
    status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    email: String,
    role: String,
    status: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    match s {
        "caretaker" => Ok(Role::Caretaker),
        "nri" => Ok(Role::Nri),
        "admin" => Ok(Role::Admin),
        other => Err(DbError::Decode(format!("unknown account role: {other}"))),
    }
}

/// Absent status means active.
fn parse_status(s: Option<&str>) -> Result<AccountStatus, DbError> {
    match s {
        None | Some("active") => Ok(AccountStatus::Active),
        Some("blocked") => Ok(AccountStatus::Blocked),
        Some(other) => Err(DbError::Decode(format!("unknown account status: {other}"))),
    }
}

impl AccountRow {
    fn into_account(self, principal_id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            principal_id,
            email: self.email,
            role: parse_role(&self.role)?,
            status: parse_status(self.status.as_deref())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        Ok(Account {
            principal_id: parse_uuid(&self.record_id, "account")?,
            email: self.email,
            role: parse_role(&self.role)?,
            status: parse_status(self.status.as_deref())?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Account repository.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> CarelinkResult<Account> {
        let id_str = input.principal_id.to_string();
        let status = input.status.unwrap_or_default();

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 email = $email, role = $role, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "account"))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("account", &id_str))?;

        Ok(row.into_account(input.principal_id)?)
    }

    async fn get(&self, principal_id: Uuid) -> CarelinkResult<Account> {
        let id_str = principal_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("account", &id_str))?;

        Ok(row.into_account(principal_id)?)
    }

    async fn set_status(
        &self,
        principal_id: Uuid,
        status: AccountStatus,
    ) -> CarelinkResult<Account> {
        let id_str = principal_id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('account', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "account"))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("account", &id_str))?;

        Ok(row.into_account(principal_id)?)
    }

    async fn list_by_role(
        &self,
        role: Role,
        pagination: Pagination,
    ) -> CarelinkResult<PaginatedResult<Account>> {
        let total = self.count_by_role(role).await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE role = $role \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("role", role.as_str().to_string()))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_account())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count_by_role(&self, role: Role) -> CarelinkResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM account WHERE role = $role GROUP ALL")
            .bind(("role", role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
