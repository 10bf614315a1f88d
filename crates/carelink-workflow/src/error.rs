//! Workflow error types.

use carelink_core::error::CarelinkError;
use carelink_core::models::account::Role;
use carelink_core::models::service_request::RequestStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("only completed requests can be reviewed")]
    NotCompleted,

    #[error("request has already been reviewed")]
    AlreadyReviewed,

    #[error("a review for this request already exists")]
    Duplicate,

    #[error("cannot move request from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("request belongs to another user")]
    NotOwner,

    #[error("{0} accounts cannot perform this action")]
    RoleNotPermitted(Role),

    #[error("service request not found")]
    NotFound,

    #[error("{0}")]
    InvalidInput(String),

    #[error("service not found")]
    ServiceNotFound,

    #[error("service is not available for requests")]
    ServiceUnavailable,

    #[error("caretaker is not accepting requests")]
    CaretakerUnavailable,

    #[error("not connected to this caretaker")]
    NotConnected,

    #[error("no caretaker has this code")]
    UnknownCaretakerCode,

    #[error("caretaker is already connected")]
    AlreadyConnected,

    #[error("failed to update: {0}")]
    UpdateFailed(String),
}

impl WorkflowError {
    /// Store failures may succeed on retry; everything else was rejected
    /// before any write.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WorkflowError::UpdateFailed(_))
    }
}

impl From<CarelinkError> for WorkflowError {
    fn from(err: CarelinkError) -> Self {
        match err {
            CarelinkError::NotFound { .. } => WorkflowError::NotFound,
            other => WorkflowError::UpdateFailed(other.to_string()),
        }
    }
}

impl From<WorkflowError> for CarelinkError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::NotFound => CarelinkError::NotFound {
                entity: "service_request".into(),
                id: String::new(),
            },
            WorkflowError::ServiceNotFound => CarelinkError::NotFound {
                entity: "service".into(),
                id: String::new(),
            },
            WorkflowError::UnknownCaretakerCode => CarelinkError::NotFound {
                entity: "caretaker_profile".into(),
                id: String::new(),
            },
            WorkflowError::InvalidTransition { from, to } => CarelinkError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            },
            WorkflowError::NotOwner
            | WorkflowError::RoleNotPermitted(_)
            | WorkflowError::NotConnected => {
                CarelinkError::AuthorizationDenied {
                    reason: err.to_string(),
                }
            }
            WorkflowError::Duplicate => CarelinkError::AlreadyExists {
                entity: "review".into(),
            },
            WorkflowError::AlreadyConnected => CarelinkError::AlreadyExists {
                entity: "caretaker_link".into(),
            },
            WorkflowError::UpdateFailed(msg) => CarelinkError::Database(msg),
            WorkflowError::RatingOutOfRange(_)
            | WorkflowError::NotCompleted
            | WorkflowError::AlreadyReviewed
            | WorkflowError::InvalidInput(_)
            | WorkflowError::ServiceUnavailable
            | WorkflowError::CaretakerUnavailable => CarelinkError::Validation {
                message: err.to_string(),
            },
        }
    }
}
