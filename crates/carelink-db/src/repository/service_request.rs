//! SurrealDB implementation of [`ServiceRequestRepository`].

use carelink_core::error::CarelinkResult;
use carelink_core::models::service_request::{
    CreateServiceRequest, RequestStatus, ServiceRequest, ServiceRequestFilter,
    UpdateServiceRequestStatus,
};
use carelink_core::repository::ServiceRequestRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ServiceRequestRow {
    service_id: String,
    service_name: String,
    caretaker_id: String,
    nri_id: String,
    nri_email: String,
    status: String,
    message: String,
    remarks: String,
    proof: String,
    reviewed: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct ServiceRequestRowWithId {
    record_id: String,
    service_id: String,
    service_name: String,
    caretaker_id: String,
    nri_id: String,
    nri_email: String,
    status: String,
    message: String,
    remarks: String,
    proof: String,
    reviewed: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

fn parse_status(s: &str) -> Result<RequestStatus, DbError> {
    match s {
        "pending" => Ok(RequestStatus::Pending),
        "in-progress" => Ok(RequestStatus::InProgress),
        "completed" => Ok(RequestStatus::Completed),
        other => Err(DbError::Decode(format!("unknown request status: {other}"))),
    }
}

impl ServiceRequestRow {
    fn into_request(self, id: Uuid) -> Result<ServiceRequest, DbError> {
        Ok(ServiceRequest {
            id,
            service_id: parse_uuid(&self.service_id, "service")?,
            service_name: self.service_name,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            nri_id: parse_uuid(&self.nri_id, "nri")?,
            nri_email: self.nri_email,
            status: parse_status(&self.status)?,
            message: self.message,
            remarks: self.remarks,
            proof: self.proof,
            reviewed: self.reviewed,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

impl ServiceRequestRowWithId {
    fn try_into_request(self) -> Result<ServiceRequest, DbError> {
        Ok(ServiceRequest {
            id: parse_uuid(&self.record_id, "service_request")?,
            service_id: parse_uuid(&self.service_id, "service")?,
            service_name: self.service_name,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            nri_id: parse_uuid(&self.nri_id, "nri")?,
            nri_email: self.nri_email,
            status: parse_status(&self.status)?,
            message: self.message,
            remarks: self.remarks,
            proof: self.proof,
            reviewed: self.reviewed,
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

/// SurrealDB implementation of the ServiceRequest repository.
#[derive(Clone)]
pub struct SurrealServiceRequestRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceRequestRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ServiceRequestRepository for SurrealServiceRequestRepository<C> {
    async fn create(&self, input: CreateServiceRequest) -> CarelinkResult<ServiceRequest> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('service_request', $id) SET \
                 service_id = $service_id, service_name = $service_name, \
                 caretaker_id = $caretaker_id, nri_id = $nri_id, \
                 nri_email = $nri_email, status = 'pending', \
                 message = $message, remarks = '', proof = '', \
                 reviewed = false, completed_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("service_id", input.service_id.to_string()))
            .bind(("service_name", input.service_name))
            .bind(("caretaker_id", input.caretaker_id.to_string()))
            .bind(("nri_id", input.nri_id.to_string()))
            .bind(("nri_email", input.nri_email))
            .bind(("message", input.message))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "service_request"))?;

        let rows: Vec<ServiceRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_request", &id_str))?;

        Ok(row.into_request(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CarelinkResult<ServiceRequest> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('service_request', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_request", &id_str))?;

        Ok(row.into_request(id)?)
    }

    async fn list(&self, filter: ServiceRequestFilter) -> CarelinkResult<Vec<ServiceRequest>> {
        let mut conditions = Vec::new();
        if filter.caretaker_id.is_some() {
            conditions.push("caretaker_id = $caretaker_id");
        }
        if filter.nri_id.is_some() {
            conditions.push("nri_id = $nri_id");
        }
        if filter.status.is_some() {
            conditions.push("status = $status");
        }

        let mut query = String::from("SELECT meta::id(id) AS record_id, * FROM service_request");
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }

        let mut builder = self.db.query(&query);
        if let Some(caretaker_id) = filter.caretaker_id {
            builder = builder.bind(("caretaker_id", caretaker_id.to_string()));
        }
        if let Some(nri_id) = filter.nri_id {
            builder = builder.bind(("nri_id", nri_id.to_string()));
        }
        if let Some(status) = filter.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<ServiceRequestRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_request())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update_status(
        &self,
        id: Uuid,
        input: UpdateServiceRequestStatus,
    ) -> CarelinkResult<ServiceRequest> {
        let id_str = id.to_string();

        let mut sets = vec!["status = $status", "completed_at = $completed_at"];
        if input.remarks.is_some() {
            sets.push("remarks = $remarks");
        }
        if input.proof.is_some() {
            sets.push("proof = $proof");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('service_request', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("completed_at", input.completed_at));

        if let Some(remarks) = input.remarks {
            builder = builder.bind(("remarks", remarks));
        }
        if let Some(proof) = input.proof {
            builder = builder.bind(("proof", proof));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "service_request"))?;

        let rows: Vec<ServiceRequestRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service_request", &id_str))?;

        Ok(row.into_request(id)?)
    }

    async fn mark_reviewed(&self, id: Uuid) -> CarelinkResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('service_request', $id) SET \
                 reviewed = true, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "service_request"))?;

        let rows: Vec<ServiceRequestRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("service_request", id_str).into());
        }

        Ok(())
    }
}
