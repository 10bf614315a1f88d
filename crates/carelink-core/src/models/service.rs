//! Service catalog domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Something a caretaker offers. NRIs raise requests against active
/// services only; the request copies the name at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub caretaker_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    /// Image URL or data URL, opaque to the backend.
    pub image: String,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateService {
    pub caretaker_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Option<f64>,
    pub image: String,
    pub is_active: bool,
}

/// Partial update. `price: Some(None)` clears the price.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateService {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Option<f64>>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}
