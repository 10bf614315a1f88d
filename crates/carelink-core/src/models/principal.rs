//! Principal domain model — the identity handle issued by the identity
//! provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    /// Opaque session token handed to the client. Only its SHA-256 digest
    /// is ever persisted.
    #[serde(skip_serializing, default)]
    pub session_token: String,
}

/// Stored credential record backing a principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub principal_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub session_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCredential {
    pub email: String,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
}
