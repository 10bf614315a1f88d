//! SurrealDB implementation of [`ConnectionRepository`].
//!
//! Profiles are keyed by the caretaker's principal id with a unique index
//! on the code. Links carry a unique `(nri_id, caretaker_id)` index, so a
//! repeated link surfaces as `AlreadyExists`.

use carelink_core::error::CarelinkResult;
use carelink_core::models::connection::{CaretakerLink, CaretakerProfile};
use carelink_core::repository::ConnectionRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    code: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ProfileRowWithId {
    record_id: String,
    code: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LinkRow {
    nri_id: String,
    caretaker_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

impl ProfileRow {
    fn into_profile(self, caretaker_id: Uuid) -> CaretakerProfile {
        CaretakerProfile {
            caretaker_id,
            code: self.code,
            created_at: self.created_at,
        }
    }
}

impl ProfileRowWithId {
    fn try_into_profile(self) -> Result<CaretakerProfile, DbError> {
        Ok(CaretakerProfile {
            caretaker_id: parse_uuid(&self.record_id, "caretaker")?,
            code: self.code,
            created_at: self.created_at,
        })
    }
}

impl LinkRow {
    fn try_into_link(self) -> Result<CaretakerLink, DbError> {
        Ok(CaretakerLink {
            nri_id: parse_uuid(&self.nri_id, "nri")?,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            created_at: self.created_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealConnectionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealConnectionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ConnectionRepository for SurrealConnectionRepository<C> {
    async fn create_profile(
        &self,
        caretaker_id: Uuid,
        code: String,
    ) -> CarelinkResult<CaretakerProfile> {
        let id_str = caretaker_id.to_string();

        let result = self
            .db
            .query("CREATE type::record('caretaker_profile', $id) SET code = $code")
            .bind(("id", id_str.clone()))
            .bind(("code", code))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "caretaker_profile"))?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("caretaker_profile", &id_str))?;

        Ok(row.into_profile(caretaker_id))
    }

    async fn get_profile(&self, caretaker_id: Uuid) -> CarelinkResult<CaretakerProfile> {
        let id_str = caretaker_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('caretaker_profile', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("caretaker_profile", &id_str))?;

        Ok(row.into_profile(caretaker_id))
    }

    async fn find_by_code(&self, code: &str) -> CarelinkResult<CaretakerProfile> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM caretaker_profile \
                 WHERE code = $code LIMIT 1",
            )
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ProfileRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("caretaker_profile", code))?;

        Ok(row.try_into_profile()?)
    }

    async fn link(&self, nri_id: Uuid, caretaker_id: Uuid) -> CarelinkResult<CaretakerLink> {
        let result = self
            .db
            .query(
                "CREATE caretaker_link SET \
                 nri_id = $nri_id, caretaker_id = $caretaker_id",
            )
            .bind(("nri_id", nri_id.to_string()))
            .bind(("caretaker_id", caretaker_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "caretaker_link"))?;

        let rows: Vec<LinkRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query("link insert returned no row".into()))?;

        Ok(row.try_into_link()?)
    }

    async fn is_linked(&self, nri_id: Uuid, caretaker_id: Uuid) -> CarelinkResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM caretaker_link \
                 WHERE nri_id = $nri_id AND caretaker_id = $caretaker_id GROUP ALL",
            )
            .bind(("nri_id", nri_id.to_string()))
            .bind(("caretaker_id", caretaker_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().is_some_and(|r| r.total > 0))
    }

    async fn links_for_nri(&self, nri_id: Uuid) -> CarelinkResult<Vec<CaretakerLink>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM caretaker_link WHERE nri_id = $nri_id \
                 ORDER BY created_at ASC",
            )
            .bind(("nri_id", nri_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LinkRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_link())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
