//! SurrealDB implementation of [`ReviewRepository`].
//!
//! The `review` table is append-only and carries a unique index on
//! `service_request_id`, so a second review for the same request fails
//! at the store even if the caller skipped its own existence check.

use carelink_core::error::CarelinkResult;
use carelink_core::models::review::{CreateReview, Review};
use carelink_core::repository::ReviewRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ReviewRow {
    service_request_id: String,
    caretaker_id: String,
    nri_id: String,
    nri_email: String,
    service_name: String,
    rating: u32,
    comment: String,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct ReviewRowWithId {
    record_id: String,
    service_request_id: String,
    caretaker_id: String,
    nri_id: String,
    nri_email: String,
    service_name: String,
    rating: u32,
    comment: String,
    created_at: Option<DateTime<Utc>>,
}

fn parse_rating(rating: u32) -> Result<u8, DbError> {
    u8::try_from(rating).map_err(|_| DbError::Decode(format!("rating out of range: {rating}")))
}

impl ReviewRow {
    fn into_review(self, id: Uuid) -> Result<Review, DbError> {
        Ok(Review {
            id,
            service_request_id: parse_uuid(&self.service_request_id, "service_request")?,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            nri_id: parse_uuid(&self.nri_id, "nri")?,
            nri_email: self.nri_email,
            service_name: self.service_name,
            rating: parse_rating(self.rating)?,
            comment: self.comment,
            created_at: self.created_at,
        })
    }
}

impl ReviewRowWithId {
    fn try_into_review(self) -> Result<Review, DbError> {
        Ok(Review {
            id: parse_uuid(&self.record_id, "review")?,
            service_request_id: parse_uuid(&self.service_request_id, "service_request")?,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            nri_id: parse_uuid(&self.nri_id, "nri")?,
            nri_email: self.nri_email,
            service_name: self.service_name,
            rating: parse_rating(self.rating)?,
            comment: self.comment,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Review repository.
#[derive(Clone)]
pub struct SurrealReviewRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealReviewRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn list_where(&self, field: &'static str, value: Uuid) -> CarelinkResult<Vec<Review>> {
        let query = format!(
            "SELECT meta::id(id) AS record_id, * FROM review WHERE {field} = $value"
        );

        let mut result = self
            .db
            .query(&query)
            .bind(("value", value.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_review())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}

impl<C: Connection> ReviewRepository for SurrealReviewRepository<C> {
    async fn create(&self, input: CreateReview) -> CarelinkResult<Review> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('review', $id) SET \
                 service_request_id = $service_request_id, \
                 caretaker_id = $caretaker_id, nri_id = $nri_id, \
                 nri_email = $nri_email, service_name = $service_name, \
                 rating = $rating, comment = $comment",
            )
            .bind(("id", id_str.clone()))
            .bind(("service_request_id", input.service_request_id.to_string()))
            .bind(("caretaker_id", input.caretaker_id.to_string()))
            .bind(("nri_id", input.nri_id.to_string()))
            .bind(("nri_email", input.nri_email))
            .bind(("service_name", input.service_name))
            .bind(("rating", u32::from(input.rating)))
            .bind(("comment", input.comment))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "review"))?;

        let rows: Vec<ReviewRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("review", &id_str))?;

        Ok(row.into_review(id)?)
    }

    async fn get_by_service_request(&self, service_request_id: Uuid) -> CarelinkResult<Review> {
        let request_id_str = service_request_id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM review \
                 WHERE service_request_id = $service_request_id",
            )
            .bind(("service_request_id", request_id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ReviewRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DbError::not_found("review", format!("service_request_id={request_id_str}"))
        })?;

        Ok(row.try_into_review()?)
    }

    async fn list_by_caretaker(&self, caretaker_id: Uuid) -> CarelinkResult<Vec<Review>> {
        self.list_where("caretaker_id", caretaker_id).await
    }

    async fn list_by_nri(&self, nri_id: Uuid) -> CarelinkResult<Vec<Review>> {
        self.list_where("nri_id", nri_id).await
    }
}
