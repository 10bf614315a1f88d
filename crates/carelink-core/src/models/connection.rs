//! Caretaker codes and NRI–caretaker links.
//!
//! Each caretaker gets a short shareable code. An NRI enters the code to
//! link to that caretaker, and may only request services from caretakers
//! they are linked to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const CARETAKER_CODE_PREFIX: &str = "CT-";
/// Characters after the prefix.
pub const CARETAKER_CODE_LEN: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaretakerProfile {
    pub caretaker_id: Uuid,
    pub code: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaretakerLink {
    pub nri_id: Uuid,
    pub caretaker_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Canonical form of a user-entered code: trimmed, upper case.
pub fn normalize_caretaker_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// `CT-` followed by eight upper-case letters or digits.
pub fn is_well_formed_code(code: &str) -> bool {
    code.strip_prefix(CARETAKER_CODE_PREFIX).is_some_and(|rest| {
        rest.len() == CARETAKER_CODE_LEN
            && rest
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    })
}
