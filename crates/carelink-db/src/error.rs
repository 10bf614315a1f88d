//! Database-specific error types and conversions.

use carelink_core::error::CarelinkError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid stored record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    AlreadyExists { entity: String },
}

impl DbError {
    /// Classify a failed write statement. Unique-index and record-id
    /// collisions become [`DbError::AlreadyExists`].
    pub(crate) fn from_write(message: String, entity: &str) -> Self {
        if message.contains("already contains") || message.contains("already exists") {
            DbError::AlreadyExists {
                entity: entity.into(),
            }
        } else {
            DbError::Query(message)
        }
    }

    pub(crate) fn not_found(entity: &str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

impl From<DbError> for CarelinkError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => CarelinkError::NotFound { entity, id },
            DbError::AlreadyExists { entity } => CarelinkError::AlreadyExists { entity },
            other => CarelinkError::Database(other.to_string()),
        }
    }
}

/// Parse a UUID stored as a string column.
pub(crate) fn parse_uuid(value: &str, field: &str) -> Result<uuid::Uuid, DbError> {
    uuid::Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_index_violation_is_already_exists() {
        let err = DbError::from_write(
            "Database index `idx_review_request` already contains 'abc'".into(),
            "review",
        );
        assert!(matches!(err, DbError::AlreadyExists { ref entity } if entity == "review"));
    }

    #[test]
    fn other_write_failures_are_query_errors() {
        let err = DbError::from_write("Found 7 for field `rating`".into(), "review");
        assert!(matches!(err, DbError::Query(_)));
    }

    #[test]
    fn converts_into_core_error() {
        let core: CarelinkError = DbError::not_found("account", "42").into();
        assert!(core.is_not_found());

        let core: CarelinkError = DbError::Decode("bad".into()).into();
        assert!(matches!(core, CarelinkError::Database(_)));
    }
}
