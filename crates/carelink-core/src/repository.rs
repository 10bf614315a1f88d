//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The store is the authority for
//! every shared record; implementations do no in-process locking and
//! callers must not assume a write is visible to an immediate read.

use uuid::Uuid;

use crate::error::CarelinkResult;
use crate::models::{
    account::{Account, AccountStatus, CreateAccount, Role},
    connection::{CaretakerLink, CaretakerProfile},
    principal::{CreateCredential, Credential},
    review::{CreateReview, Review},
    service::{CreateService, Service, UpdateService},
    service_request::{
        CreateServiceRequest, ServiceRequest, ServiceRequestFilter, UpdateServiceRequestStatus,
    },
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Identity & accounts
// ---------------------------------------------------------------------------

/// Credential storage for the bundled identity provider.
pub trait CredentialRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the email is taken.
    fn create(
        &self,
        input: CreateCredential,
    ) -> impl Future<Output = CarelinkResult<Credential>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = CarelinkResult<Credential>> + Send;
    /// `Some(hash)` records an issued session token, `None` revokes it.
    fn set_session_token_hash(
        &self,
        principal_id: Uuid,
        token_hash: Option<String>,
    ) -> impl Future<Output = CarelinkResult<()>> + Send;
}

pub trait AccountRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the principal already has an account.
    fn create(&self, input: CreateAccount) -> impl Future<Output = CarelinkResult<Account>> + Send;
    /// Fails with `NotFound` when the principal has no account.
    fn get(&self, principal_id: Uuid) -> impl Future<Output = CarelinkResult<Account>> + Send;
    /// Reapplying the current status is a no-op; concurrent writers are
    /// last-write-wins.
    fn set_status(
        &self,
        principal_id: Uuid,
        status: AccountStatus,
    ) -> impl Future<Output = CarelinkResult<Account>> + Send;
    fn list_by_role(
        &self,
        role: Role,
        pagination: Pagination,
    ) -> impl Future<Output = CarelinkResult<PaginatedResult<Account>>> + Send;
    fn count_by_role(&self, role: Role) -> impl Future<Output = CarelinkResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Service catalog & caretaker links
// ---------------------------------------------------------------------------

pub trait ServiceRepository: Send + Sync {
    fn create(&self, input: CreateService) -> impl Future<Output = CarelinkResult<Service>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CarelinkResult<Service>> + Send;
    /// Apply the set fields and stamp `updated_at`.
    fn update(
        &self,
        id: Uuid,
        input: UpdateService,
    ) -> impl Future<Output = CarelinkResult<Service>> + Send;
    /// Fails with `NotFound` when there is nothing to delete.
    fn delete(&self, id: Uuid) -> impl Future<Output = CarelinkResult<()>> + Send;
    fn list_by_caretaker(
        &self,
        caretaker_id: Uuid,
        active_only: bool,
    ) -> impl Future<Output = CarelinkResult<Vec<Service>>> + Send;
}

/// Caretaker codes and the NRI–caretaker links made with them.
pub trait ConnectionRepository: Send + Sync {
    /// Fails with `AlreadyExists` when the caretaker already has a profile
    /// or the code is taken.
    fn create_profile(
        &self,
        caretaker_id: Uuid,
        code: String,
    ) -> impl Future<Output = CarelinkResult<CaretakerProfile>> + Send;
    fn get_profile(
        &self,
        caretaker_id: Uuid,
    ) -> impl Future<Output = CarelinkResult<CaretakerProfile>> + Send;
    /// Exact match on the normalized code.
    fn find_by_code(&self, code: &str) -> impl Future<Output = CarelinkResult<CaretakerProfile>> + Send;
    /// Fails with `AlreadyExists` when the pair is already linked.
    fn link(
        &self,
        nri_id: Uuid,
        caretaker_id: Uuid,
    ) -> impl Future<Output = CarelinkResult<CaretakerLink>> + Send;
    fn is_linked(
        &self,
        nri_id: Uuid,
        caretaker_id: Uuid,
    ) -> impl Future<Output = CarelinkResult<bool>> + Send;
    fn links_for_nri(
        &self,
        nri_id: Uuid,
    ) -> impl Future<Output = CarelinkResult<Vec<CaretakerLink>>> + Send;
}

// ---------------------------------------------------------------------------
// Service requests & reviews
// ---------------------------------------------------------------------------

pub trait ServiceRequestRepository: Send + Sync {
    fn create(
        &self,
        input: CreateServiceRequest,
    ) -> impl Future<Output = CarelinkResult<ServiceRequest>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CarelinkResult<ServiceRequest>> + Send;
    /// Requests matching every set field of the filter, in no particular
    /// order.
    fn list(
        &self,
        filter: ServiceRequestFilter,
    ) -> impl Future<Output = CarelinkResult<Vec<ServiceRequest>>> + Send;
    /// Apply a status change and stamp `updated_at`.
    fn update_status(
        &self,
        id: Uuid,
        input: UpdateServiceRequestStatus,
    ) -> impl Future<Output = CarelinkResult<ServiceRequest>> + Send;
    fn mark_reviewed(&self, id: Uuid) -> impl Future<Output = CarelinkResult<()>> + Send;
}

pub trait ReviewRepository: Send + Sync {
    /// Fails with `AlreadyExists` if the request already has a review.
    fn create(&self, input: CreateReview) -> impl Future<Output = CarelinkResult<Review>> + Send;
    /// Fails with `NotFound` when the request has not been reviewed.
    fn get_by_service_request(
        &self,
        service_request_id: Uuid,
    ) -> impl Future<Output = CarelinkResult<Review>> + Send;
    fn list_by_caretaker(
        &self,
        caretaker_id: Uuid,
    ) -> impl Future<Output = CarelinkResult<Vec<Review>>> + Send;
    fn list_by_nri(&self, nri_id: Uuid) -> impl Future<Output = CarelinkResult<Vec<Review>>> + Send;
}
