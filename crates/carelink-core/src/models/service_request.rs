//! Service request domain model.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a service request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 3] = [
        RequestStatus::Pending,
        RequestStatus::InProgress,
        RequestStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in-progress",
            RequestStatus::Completed => "completed",
        }
    }

    /// Completed requests accept no further status changes.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }

    /// Pending and in-progress requests count as active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, RequestStatus::Pending | RequestStatus::InProgress)
    }

    /// Caretakers may move a non-completed request to any state,
    /// including backwards to correct a mistake.
    #[must_use]
    pub fn can_transition_to(&self, _target: &Self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub service_id: Uuid,
    pub service_name: String,
    pub caretaker_id: Uuid,
    pub nri_id: Uuid,
    pub nri_email: String,
    pub status: RequestStatus,
    pub message: String,
    pub remarks: String,
    pub proof: String,
    pub reviewed: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Present if and only if `status` is [`RequestStatus::Completed`].
    pub completed_at: Option<DateTime<Utc>>,
}

impl ServiceRequest {
    /// Completed and not yet closed out by a review.
    pub fn awaiting_review(&self) -> bool {
        self.status == RequestStatus::Completed && !self.reviewed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub service_id: Uuid,
    pub service_name: String,
    pub caretaker_id: Uuid,
    pub nri_id: Uuid,
    pub nri_email: String,
    pub message: String,
}

/// Field update applied by a caretaker status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateServiceRequestStatus {
    pub status: RequestStatus,
    pub remarks: Option<String>,
    pub proof: Option<String>,
    /// Must be `Some` exactly when `status` is completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Filter for request listings. `None` fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRequestFilter {
    pub caretaker_id: Option<Uuid>,
    pub nri_id: Option<Uuid>,
    pub status: Option<RequestStatus>,
}

impl ServiceRequestFilter {
    pub fn for_caretaker(caretaker_id: Uuid) -> Self {
        Self {
            caretaker_id: Some(caretaker_id),
            ..Default::default()
        }
    }

    pub fn for_nri(nri_id: Uuid) -> Self {
        Self {
            nri_id: Some(nri_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, request: &ServiceRequest) -> bool {
        self.caretaker_id.is_none_or(|id| id == request.caretaker_id)
            && self.nri_id.is_none_or(|id| id == request.nri_id)
            && self.status.is_none_or(|s| s == request.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_is_terminal() {
        for target in RequestStatus::ALL {
            assert!(!RequestStatus::Completed.can_transition_to(&target));
        }
    }

    #[test]
    fn non_completed_states_can_move_anywhere() {
        for from in [RequestStatus::Pending, RequestStatus::InProgress] {
            for to in RequestStatus::ALL {
                assert!(from.can_transition_to(&to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn in_progress_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn filter_matches_on_every_set_field() {
        let caretaker = Uuid::new_v4();
        let request = ServiceRequest {
            id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            service_name: "Rent collection".into(),
            caretaker_id: caretaker,
            nri_id: Uuid::new_v4(),
            nri_email: "owner@example.com".into(),
            status: RequestStatus::Pending,
            message: String::new(),
            remarks: String::new(),
            proof: String::new(),
            reviewed: false,
            created_at: None,
            updated_at: None,
            completed_at: None,
        };

        assert!(ServiceRequestFilter::default().matches(&request));
        assert!(ServiceRequestFilter::for_caretaker(caretaker).matches(&request));
        assert!(
            !ServiceRequestFilter::for_caretaker(caretaker)
                .with_status(RequestStatus::Completed)
                .matches(&request)
        );
        assert!(!ServiceRequestFilter::for_nri(caretaker).matches(&request));
    }
}
