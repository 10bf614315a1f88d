//! CareLink Auth — identity provider adapter, session resolution,
//! role-scoped access decisions and account administration.

pub mod admin;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod password;
pub mod resolver;
pub mod service;
pub mod token;

pub use admin::AdminService;
pub use config::{AuthConfig, ResolverConfig};
pub use error::AuthError;
pub use guard::{AccessGuard, GuardDecision, RedirectTarget, decide, landing};
pub use identity::{IdentityProvider, LocalIdentityProvider};
pub use resolver::{SessionHandle, SessionResolver};
pub use service::{AuthService, LoginOutput, SignUpInput, SignUpOutput};
