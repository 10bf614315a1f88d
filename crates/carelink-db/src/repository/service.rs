//! SurrealDB implementation of [`ServiceRepository`].

use carelink_core::error::CarelinkResult;
use carelink_core::models::service::{CreateService, Service, UpdateService};
use carelink_core::repository::ServiceRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{DbError, parse_uuid};

#[derive(Debug, SurrealValue)]
struct ServiceRow {
    caretaker_id: String,
    name: String,
    description: String,
    price: Option<f64>,
    image: String,
    is_active: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, SurrealValue)]
struct ServiceRowWithId {
    record_id: String,
    caretaker_id: String,
    name: String,
    description: String,
    price: Option<f64>,
    image: String,
    is_active: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ServiceRow {
    fn into_service(self, id: Uuid) -> Result<Service, DbError> {
        Ok(Service {
            id,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ServiceRowWithId {
    fn try_into_service(self) -> Result<Service, DbError> {
        Ok(Service {
            id: parse_uuid(&self.record_id, "service")?,
            caretaker_id: parse_uuid(&self.caretaker_id, "caretaker")?,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct SurrealServiceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ServiceRepository for SurrealServiceRepository<C> {
    async fn create(&self, input: CreateService) -> CarelinkResult<Service> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('service', $id) SET \
                 caretaker_id = $caretaker_id, name = $name, \
                 description = $description, price = $price, \
                 image = $image, is_active = $is_active",
            )
            .bind(("id", id_str.clone()))
            .bind(("caretaker_id", input.caretaker_id.to_string()))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("price", input.price))
            .bind(("image", input.image))
            .bind(("is_active", input.is_active))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "service"))?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", &id_str))?;

        Ok(row.into_service(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CarelinkResult<Service> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('service', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", &id_str))?;

        Ok(row.into_service(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateService) -> CarelinkResult<Service> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.price.is_some() {
            sets.push("price = $price");
        }
        if input.image.is_some() {
            sets.push("image = $image");
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('service', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(price) = input.price {
            builder = builder.bind(("price", price));
        }
        if let Some(image) = input.image {
            builder = builder.bind(("image", image));
        }
        if let Some(is_active) = input.is_active {
            builder = builder.bind(("is_active", is_active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "service"))?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::not_found("service", &id_str))?;

        Ok(row.into_service(id)?)
    }

    async fn delete(&self, id: Uuid) -> CarelinkResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("DELETE type::record('service', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_write(e.to_string(), "service"))?;

        let rows: Vec<ServiceRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::not_found("service", id_str).into());
        }

        Ok(())
    }

    async fn list_by_caretaker(
        &self,
        caretaker_id: Uuid,
        active_only: bool,
    ) -> CarelinkResult<Vec<Service>> {
        let query = if active_only {
            "SELECT meta::id(id) AS record_id, * FROM service \
             WHERE caretaker_id = $caretaker_id AND is_active = true \
             ORDER BY name ASC"
        } else {
            "SELECT meta::id(id) AS record_id, * FROM service \
             WHERE caretaker_id = $caretaker_id \
             ORDER BY name ASC"
        };

        let mut result = self
            .db
            .query(query)
            .bind(("caretaker_id", caretaker_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ServiceRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_service())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }
}
