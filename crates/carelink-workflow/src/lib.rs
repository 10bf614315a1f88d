//! CareLink Workflow — the service catalog, the service request state
//! machine, review submission and the aggregates shown on dashboards.

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod lifecycle;
pub mod stats;

pub use catalog::{ServiceCatalog, ServiceDraft};
pub use dashboard::{
    AdminOverview, CaretakerDashboard, DashboardConfig, DashboardService, NriDashboard,
};
pub use error::WorkflowError;
pub use lifecycle::{NewServiceRequest, RequestLifecycle, ReviewInput, StatusUpdate};
pub use stats::{RequestCounts, Timestamped, average_rating, recent, sort_newest_first};
