//! SurrealDB repository implementations.

mod account;
mod connection;
mod credential;
mod review;
mod service;
mod service_request;

pub use account::SurrealAccountRepository;
pub use connection::SurrealConnectionRepository;
pub use credential::SurrealCredentialRepository;
pub use review::SurrealReviewRepository;
pub use service::SurrealServiceRepository;
pub use service_request::SurrealServiceRequestRepository;
