//! Authentication configuration.

use std::time::Duration;

/// Configuration for the identity provider and auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Minimum password length accepted at sign-up (default: 6).
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: None,
            min_password_length: 6,
        }
    }
}

/// Configuration for the background session resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// How often the current principal's account is re-read so that an
    /// admin block takes effect on open sessions. `None` disables
    /// periodic re-resolution (default: 30 seconds).
    pub refresh_interval: Option<Duration>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Some(Duration::from_secs(30)),
        }
    }
}
