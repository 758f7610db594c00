//! Database-specific error types and conversions.

use pawtag_core::error::PawtagError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Row decode failed: {0}")]
    Decode(String),
}

impl From<DbError> for PawtagError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PawtagError::NotFound { entity, id },
            other => PawtagError::Database(other.to_string()),
        }
    }
}
