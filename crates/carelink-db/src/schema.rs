//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Credentials (identity provider storage, keyed by principal id)
-- =======================================================================
DEFINE TABLE credential SCHEMAFULL;
DEFINE FIELD email ON TABLE credential TYPE string;
DEFINE FIELD password_hash ON TABLE credential TYPE string;
DEFINE FIELD session_token_hash ON TABLE credential TYPE option<string>;
DEFINE FIELD created_at ON TABLE credential TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_credential_email ON TABLE credential \
    COLUMNS email UNIQUE;

-- =======================================================================
-- Accounts (keyed by principal id; role is write-once)
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD role ON TABLE account TYPE string \
    ASSERT $value IN ['caretaker', 'nri', 'admin'];
DEFINE FIELD status ON TABLE account TYPE option<string> \
    ASSERT $value = NONE OR $value IN ['active', 'blocked'];
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_role ON TABLE account COLUMNS role;

-- =======================================================================
-- Caretaker profiles (keyed by caretaker principal id) and NRI links
-- =======================================================================
DEFINE TABLE caretaker_profile SCHEMAFULL;
DEFINE FIELD code ON TABLE caretaker_profile TYPE string \
    ASSERT string::len($value) > 0;
DEFINE FIELD created_at ON TABLE caretaker_profile TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_caretaker_code ON TABLE caretaker_profile \
    COLUMNS code UNIQUE;

DEFINE TABLE caretaker_link SCHEMAFULL;
DEFINE FIELD nri_id ON TABLE caretaker_link TYPE string;
DEFINE FIELD caretaker_id ON TABLE caretaker_link TYPE string;
DEFINE FIELD created_at ON TABLE caretaker_link TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_link_pair ON TABLE caretaker_link \
    COLUMNS nri_id, caretaker_id UNIQUE;

-- =======================================================================
-- Services offered by caretakers
-- =======================================================================
DEFINE TABLE service SCHEMAFULL;
DEFINE FIELD caretaker_id ON TABLE service TYPE string;
DEFINE FIELD name ON TABLE service TYPE string \
    ASSERT string::len(string::trim($value)) > 0;
DEFINE FIELD description ON TABLE service TYPE string DEFAULT '';
DEFINE FIELD price ON TABLE service TYPE option<float> \
    ASSERT $value = NONE OR $value >= 0;
DEFINE FIELD image ON TABLE service TYPE string DEFAULT '';
DEFINE FIELD is_active ON TABLE service TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE service TYPE option<datetime> \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE service TYPE option<datetime> \
    DEFAULT time::now();
DEFINE INDEX idx_service_caretaker ON TABLE service COLUMNS caretaker_id;

-- =======================================================================
-- Service requests
-- =======================================================================
DEFINE TABLE service_request SCHEMAFULL;
DEFINE FIELD service_id ON TABLE service_request TYPE string;
DEFINE FIELD service_name ON TABLE service_request TYPE string;
DEFINE FIELD caretaker_id ON TABLE service_request TYPE string;
DEFINE FIELD nri_id ON TABLE service_request TYPE string;
DEFINE FIELD nri_email ON TABLE service_request TYPE string;
DEFINE FIELD status ON TABLE service_request TYPE string \
    ASSERT $value IN ['pending', 'in-progress', 'completed'];
DEFINE FIELD message ON TABLE service_request TYPE string DEFAULT '';
DEFINE FIELD remarks ON TABLE service_request TYPE string DEFAULT '';
DEFINE FIELD proof ON TABLE service_request TYPE string DEFAULT '';
DEFINE FIELD reviewed ON TABLE service_request TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE service_request TYPE option<datetime> \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE service_request TYPE option<datetime> \
    DEFAULT time::now();
DEFINE FIELD completed_at ON TABLE service_request \
    TYPE option<datetime>;
DEFINE INDEX idx_request_caretaker ON TABLE service_request \
    COLUMNS caretaker_id;
DEFINE INDEX idx_request_nri ON TABLE service_request COLUMNS nri_id;
DEFINE INDEX idx_request_status ON TABLE service_request COLUMNS status;

-- =======================================================================
-- Reviews (append-only, one per service request)
-- =======================================================================
DEFINE TABLE review SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD service_request_id ON TABLE review TYPE string;
DEFINE FIELD caretaker_id ON TABLE review TYPE string;
DEFINE FIELD nri_id ON TABLE review TYPE string;
DEFINE FIELD nri_email ON TABLE review TYPE string;
DEFINE FIELD service_name ON TABLE review TYPE string;
DEFINE FIELD rating ON TABLE review TYPE int \
    ASSERT $value >= 1 AND $value <= 5;
DEFINE FIELD comment ON TABLE review TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE review TYPE option<datetime> \
    DEFAULT time::now();
DEFINE INDEX idx_review_request ON TABLE review \
    COLUMNS service_request_id UNIQUE;
DEFINE INDEX idx_review_caretaker ON TABLE review COLUMNS caretaker_id;
DEFINE INDEX idx_review_nri ON TABLE review COLUMNS nri_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
