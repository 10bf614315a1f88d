//! Per-role dashboard summaries.

use std::collections::HashSet;

use carelink_core::models::account::Role;
use carelink_core::models::service_request::{ServiceRequest, ServiceRequestFilter};
use carelink_core::models::session::Actor;
use carelink_core::repository::{
    AccountRepository, ConnectionRepository, ReviewRepository, ServiceRequestRepository,
};
use serde::Serialize;

use crate::error::WorkflowError;
use crate::stats::{RequestCounts, average_rating, recent};

/// How many recent requests each dashboard lists.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub caretaker_recent: usize,
    pub nri_recent: usize,
    pub admin_recent: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            caretaker_recent: 5,
            nri_recent: 5,
            admin_recent: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaretakerDashboard {
    pub counts: RequestCounts,
    /// Distinct NRIs who have raised requests with this caretaker.
    pub connected_nris: usize,
    pub review_count: usize,
    pub average_rating: f64,
    pub recent_requests: Vec<ServiceRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NriDashboard {
    pub counts: RequestCounts,
    /// Caretakers linked by code, whether or not anything was requested.
    pub connected_caretakers: usize,
    pub recent_requests: Vec<ServiceRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub nri_accounts: u64,
    pub caretaker_accounts: u64,
    pub counts: RequestCounts,
    pub recent_activity: Vec<ServiceRequest>,
}

pub struct DashboardService<R, V, A, C>
where
    R: ServiceRequestRepository,
    V: ReviewRepository,
    A: AccountRepository,
    C: ConnectionRepository,
{
    requests: R,
    reviews: V,
    accounts: A,
    connections: C,
    config: DashboardConfig,
}

impl<R, V, A, C> DashboardService<R, V, A, C>
where
    R: ServiceRequestRepository,
    V: ReviewRepository,
    A: AccountRepository,
    C: ConnectionRepository,
{
    pub fn new(
        requests: R,
        reviews: V,
        accounts: A,
        connections: C,
        config: DashboardConfig,
    ) -> Self {
        Self {
            requests,
            reviews,
            accounts,
            connections,
            config,
        }
    }

    pub async fn caretaker(&self, actor: &Actor) -> Result<CaretakerDashboard, WorkflowError> {
        if actor.role != Role::Caretaker {
            return Err(WorkflowError::RoleNotPermitted(actor.role));
        }

        let requests = self
            .requests
            .list(ServiceRequestFilter::for_caretaker(actor.principal_id))
            .await?;
        let reviews = self.reviews.list_by_caretaker(actor.principal_id).await?;

        let connected_nris = requests
            .iter()
            .map(|r| r.nri_id)
            .collect::<HashSet<_>>()
            .len();

        Ok(CaretakerDashboard {
            counts: RequestCounts::tally(&requests),
            connected_nris,
            review_count: reviews.len(),
            average_rating: average_rating(&reviews),
            recent_requests: recent(requests, self.config.caretaker_recent),
        })
    }

    pub async fn nri(&self, actor: &Actor) -> Result<NriDashboard, WorkflowError> {
        if actor.role != Role::Nri {
            return Err(WorkflowError::RoleNotPermitted(actor.role));
        }

        let requests = self
            .requests
            .list(ServiceRequestFilter::for_nri(actor.principal_id))
            .await?;
        let connected_caretakers = self
            .connections
            .links_for_nri(actor.principal_id)
            .await?
            .len();

        Ok(NriDashboard {
            counts: RequestCounts::tally(&requests),
            connected_caretakers,
            recent_requests: recent(requests, self.config.nri_recent),
        })
    }

    pub async fn admin(&self, actor: &Actor) -> Result<AdminOverview, WorkflowError> {
        if actor.role != Role::Admin {
            return Err(WorkflowError::RoleNotPermitted(actor.role));
        }

        let nri_accounts = self.accounts.count_by_role(Role::Nri).await?;
        let caretaker_accounts = self.accounts.count_by_role(Role::Caretaker).await?;
        let requests = self.requests.list(ServiceRequestFilter::default()).await?;

        Ok(AdminOverview {
            nri_accounts,
            caretaker_accounts,
            counts: RequestCounts::tally(&requests),
            recent_activity: recent(requests, self.config.admin_recent),
        })
    }
}
