//! Review domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest accepted star rating.
pub const MIN_RATING: u8 = 1;
/// Highest accepted star rating.
pub const MAX_RATING: u8 = 5;

/// An NRI's rating of one completed service request. Immutable once
/// created, and at most one exists per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub service_request_id: Uuid,
    pub caretaker_id: Uuid,
    pub nri_id: Uuid,
    pub nri_email: String,
    pub service_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReview {
    pub service_request_id: Uuid,
    pub caretaker_id: Uuid,
    pub nri_id: Uuid,
    pub nri_email: String,
    pub service_name: String,
    pub rating: u8,
    pub comment: String,
}
