//! Database-specific error types and conversions.

use domari_core::error::DomariError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row mapping failed: {0}")]
    Mapping(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for DomariError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => DomariError::NotFound { entity, id },
            other => DomariError::Database(other.to_string()),
        }
    }
}
