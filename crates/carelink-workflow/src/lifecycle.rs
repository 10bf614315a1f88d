//! Service request lifecycle.
//!
//! An NRI raises a request against an active service of a caretaker they
//! are connected to; name and caretaker are taken from the catalog entry.
//! Requests move `pending → in-progress → completed`. Caretakers drive the
//! transitions and may step back between the non-completed states;
//! `completed` is terminal and stamps `completed_at`. A completed request
//! can be reviewed once by the NRI who raised it.
//!
//! Reviews and the `reviewed` flag are two separate writes. Before creating
//! a review the engine looks for an existing one keyed by the request id,
//! so a failed flag update can never lead to a second review.

use carelink_core::error::CarelinkError;
use carelink_core::models::account::Role;
use carelink_core::models::review::{CreateReview, MAX_RATING, MIN_RATING, Review};
use carelink_core::models::service_request::{
    CreateServiceRequest, RequestStatus, ServiceRequest, ServiceRequestFilter,
    UpdateServiceRequestStatus,
};
use carelink_core::models::session::Actor;
use carelink_core::repository::{
    AccountRepository, ConnectionRepository, ReviewRepository, ServiceRepository,
    ServiceRequestRepository,
};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::ServiceCatalog;
use crate::error::WorkflowError;
use crate::stats::sort_newest_first;

/// An NRI's ask for one of a caretaker's services.
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
    pub service_id: Uuid,
    pub message: String,
}

/// A caretaker's status change. `None` leaves remarks/proof untouched.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: RequestStatus,
    pub remarks: Option<String>,
    pub proof: Option<String>,
}

impl StatusUpdate {
    pub fn to(status: RequestStatus) -> Self {
        Self {
            status,
            remarks: None,
            proof: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub rating: u8,
    pub comment: Option<String>,
}

pub(crate) fn require_role(actor: &Actor, role: Role) -> Result<(), WorkflowError> {
    if actor.role != role {
        return Err(WorkflowError::RoleNotPermitted(actor.role));
    }
    Ok(())
}

/// Request workflow over the request and review stores, with the
/// catalog deciding what may be requested.
pub struct RequestLifecycle<R, V, S, C, A>
where
    R: ServiceRequestRepository,
    V: ReviewRepository,
    S: ServiceRepository,
    C: ConnectionRepository,
    A: AccountRepository,
{
    requests: R,
    reviews: V,
    catalog: ServiceCatalog<S, C, A>,
}

impl<R, V, S, C, A> RequestLifecycle<R, V, S, C, A>
where
    R: ServiceRequestRepository,
    V: ReviewRepository,
    S: ServiceRepository,
    C: ConnectionRepository,
    A: AccountRepository,
{
    pub fn new(requests: R, reviews: V, catalog: ServiceCatalog<S, C, A>) -> Self {
        Self {
            requests,
            reviews,
            catalog,
        }
    }

    pub fn catalog(&self) -> &ServiceCatalog<S, C, A> {
        &self.catalog
    }

    /// Raise a new request. NRIs only; it starts `pending` and unreviewed.
    /// Nothing is written unless the service is requestable.
    pub async fn create_request(
        &self,
        actor: &Actor,
        input: NewServiceRequest,
    ) -> Result<ServiceRequest, WorkflowError> {
        require_role(actor, Role::Nri)?;
        let service = self.catalog.requestable(actor, input.service_id).await?;

        let request = self
            .requests
            .create(CreateServiceRequest {
                service_id: service.id,
                service_name: service.name,
                caretaker_id: service.caretaker_id,
                nri_id: actor.principal_id,
                nri_email: actor.email.clone(),
                message: input.message.trim().to_string(),
            })
            .await
            .map_err(|e| WorkflowError::UpdateFailed(e.to_string()))?;

        info!(
            request_id = %request.id,
            nri_id = %request.nri_id,
            caretaker_id = %request.caretaker_id,
            "Service request created"
        );
        Ok(request)
    }

    /// Fetch one request visible to `actor`: its caretaker, its NRI, or an
    /// admin.
    pub async fn request(&self, actor: &Actor, id: Uuid) -> Result<ServiceRequest, WorkflowError> {
        let request = self.requests.get_by_id(id).await?;
        let visible = match actor.role {
            Role::Admin => true,
            Role::Caretaker => request.caretaker_id == actor.principal_id,
            Role::Nri => request.nri_id == actor.principal_id,
        };
        if !visible {
            return Err(WorkflowError::NotOwner);
        }
        Ok(request)
    }

    /// Move a request to another state. Only the assigned caretaker may do
    /// this, and nothing leaves `completed`.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: Uuid,
        update: StatusUpdate,
    ) -> Result<ServiceRequest, WorkflowError> {
        require_role(actor, Role::Caretaker)?;

        let current = self.requests.get_by_id(id).await?;
        if current.caretaker_id != actor.principal_id {
            return Err(WorkflowError::NotOwner);
        }
        if !current.status.can_transition_to(&update.status) {
            return Err(WorkflowError::InvalidTransition {
                from: current.status,
                to: update.status,
            });
        }

        let completed_at = (update.status == RequestStatus::Completed).then(Utc::now);

        let updated = self
            .requests
            .update_status(
                id,
                UpdateServiceRequestStatus {
                    status: update.status,
                    remarks: update.remarks.map(|r| r.trim().to_string()),
                    proof: update.proof,
                    completed_at,
                },
            )
            .await?;

        info!(
            request_id = %id,
            from = %current.status,
            to = %updated.status,
            "Service request status changed"
        );
        Ok(updated)
    }

    /// Rate a completed request. Only the NRI who raised it may, and only
    /// once.
    pub async fn submit_review(
        &self,
        actor: &Actor,
        id: Uuid,
        input: ReviewInput,
    ) -> Result<Review, WorkflowError> {
        // 1. Validate before touching the store.
        if !(MIN_RATING..=MAX_RATING).contains(&input.rating) {
            return Err(WorkflowError::RatingOutOfRange(input.rating));
        }
        require_role(actor, Role::Nri)?;

        // 2. Check ownership and eligibility.
        let request = self.requests.get_by_id(id).await?;
        if request.nri_id != actor.principal_id {
            return Err(WorkflowError::NotOwner);
        }
        if request.status != RequestStatus::Completed {
            return Err(WorkflowError::NotCompleted);
        }
        if request.reviewed {
            return Err(WorkflowError::AlreadyReviewed);
        }

        // 3. A review may exist from an attempt whose flag update failed.
        match self.reviews.get_by_service_request(id).await {
            Ok(_) => {
                self.repair_reviewed_flag(id).await;
                return Err(WorkflowError::Duplicate);
            }
            Err(CarelinkError::NotFound { .. }) => {}
            Err(e) => return Err(WorkflowError::UpdateFailed(e.to_string())),
        }

        // 4. Write the review. The store's unique index catches a racing
        //    submission.
        let review = self
            .reviews
            .create(CreateReview {
                service_request_id: request.id,
                caretaker_id: request.caretaker_id,
                nri_id: request.nri_id,
                nri_email: request.nri_email.clone(),
                service_name: request.service_name.clone(),
                rating: input.rating,
                comment: input
                    .comment
                    .map(|c| c.trim().to_string())
                    .unwrap_or_default(),
            })
            .await;
        let review = match review {
            Ok(review) => review,
            Err(CarelinkError::AlreadyExists { .. }) => {
                self.repair_reviewed_flag(id).await;
                return Err(WorkflowError::Duplicate);
            }
            Err(e) => return Err(WorkflowError::UpdateFailed(e.to_string())),
        };

        // 5. Close out the request.
        if let Err(e) = self.requests.mark_reviewed(id).await {
            warn!(
                request_id = %id,
                review_id = %review.id,
                error = %e,
                "Review stored but reviewed flag not set; reconciled on next attempt"
            );
        }

        info!(request_id = %id, review_id = %review.id, rating = review.rating, "Review submitted");
        Ok(review)
    }

    async fn repair_reviewed_flag(&self, id: Uuid) {
        match self.requests.mark_reviewed(id).await {
            Ok(()) => info!(request_id = %id, "Reconciled reviewed flag with existing review"),
            Err(e) => warn!(request_id = %id, error = %e, "Failed to reconcile reviewed flag"),
        }
    }

    /// Requests visible to `actor`, newest first: their own as caretaker or
    /// NRI, all of them as admin.
    pub async fn requests_for(
        &self,
        actor: &Actor,
        status: Option<RequestStatus>,
    ) -> Result<Vec<ServiceRequest>, WorkflowError> {
        let mut filter = match actor.role {
            Role::Caretaker => ServiceRequestFilter::for_caretaker(actor.principal_id),
            Role::Nri => ServiceRequestFilter::for_nri(actor.principal_id),
            Role::Admin => ServiceRequestFilter::default(),
        };
        filter.status = status;

        let mut requests = self.requests.list(filter).await?;
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// The NRI's completed requests still waiting for a review.
    pub async fn pending_reviews(&self, actor: &Actor) -> Result<Vec<ServiceRequest>, WorkflowError> {
        require_role(actor, Role::Nri)?;
        let filter =
            ServiceRequestFilter::for_nri(actor.principal_id).with_status(RequestStatus::Completed);

        let mut requests: Vec<_> = self
            .requests
            .list(filter)
            .await?
            .into_iter()
            .filter(ServiceRequest::awaiting_review)
            .collect();
        sort_newest_first(&mut requests);
        Ok(requests)
    }

    /// Reviews the NRI has written, newest first.
    pub async fn reviews_by_nri(&self, actor: &Actor) -> Result<Vec<Review>, WorkflowError> {
        require_role(actor, Role::Nri)?;
        let mut reviews = self.reviews.list_by_nri(actor.principal_id).await?;
        sort_newest_first(&mut reviews);
        Ok(reviews)
    }

    /// Reviews of a caretaker's work, newest first. Caretakers see their
    /// own, NRIs those of caretakers they are connected to, admins any.
    pub async fn reviews_for_caretaker(
        &self,
        actor: &Actor,
        caretaker_id: Uuid,
    ) -> Result<Vec<Review>, WorkflowError> {
        match actor.role {
            Role::Admin => {}
            Role::Caretaker => {
                if caretaker_id != actor.principal_id {
                    return Err(WorkflowError::NotOwner);
                }
            }
            Role::Nri => {
                if !self.catalog.is_linked(actor.principal_id, caretaker_id).await? {
                    return Err(WorkflowError::NotConnected);
                }
            }
        }

        let mut reviews = self.reviews.list_by_caretaker(caretaker_id).await?;
        sort_newest_first(&mut reviews);
        Ok(reviews)
    }
}
