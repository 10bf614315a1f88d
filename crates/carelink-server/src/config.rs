//! Server configuration read from `CARELINK_*` environment variables.

use std::env;
use std::time::Duration;

use carelink_auth::{AuthConfig, ResolverConfig};
use carelink_db::DbConfig;

use crate::error::ServerError;

/// Credentials for the first admin account, created at startup when no
/// admin exists yet.
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub resolver: ResolverConfig,
    pub admin: Option<AdminBootstrap>,
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ServerError> {
    value
        .parse()
        .map_err(|_| ServerError::Config(format!("{name}: invalid value {value:?}")))
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ServerError> {
        let mut config = Self::default();

        if let Some(url) = var("CARELINK_DB_URL") {
            config.db.url = url;
        }
        if let Some(ns) = var("CARELINK_DB_NAMESPACE") {
            config.db.namespace = ns;
        }
        if let Some(db) = var("CARELINK_DB_DATABASE") {
            config.db.database = db;
        }
        if let Some(user) = var("CARELINK_DB_USERNAME") {
            config.db.username = user;
        }
        if let Some(password) = var("CARELINK_DB_PASSWORD") {
            config.db.password = password;
        }

        config.auth.pepper = var("CARELINK_PASSWORD_PEPPER");
        if let Some(len) = var("CARELINK_MIN_PASSWORD_LENGTH") {
            config.auth.min_password_length = parse("CARELINK_MIN_PASSWORD_LENGTH", &len)?;
        }

        // 0 disables periodic re-resolution.
        if let Some(secs) = var("CARELINK_SESSION_REFRESH_SECS") {
            let secs: u64 = parse("CARELINK_SESSION_REFRESH_SECS", &secs)?;
            config.resolver.refresh_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config.admin = match (var("CARELINK_ADMIN_EMAIL"), var("CARELINK_ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (None, None) => None,
            _ => {
                return Err(ServerError::Config(
                    "CARELINK_ADMIN_EMAIL and CARELINK_ADMIN_PASSWORD must be set together".into(),
                ));
            }
        };

        Ok(config)
    }
}
