//! Error types for the Domari system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomariError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },

    #[error("Authorization denied: {reason}")]
    AuthorizationDenied { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Plan limit reached for {resource} (limit {limit})")]
    QuotaExceeded { resource: String, limit: u64 },

    #[error("External service {service} failed: {reason}")]
    ExternalService { service: String, reason: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomariError {
    /// Shorthand for a business-rule or input validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for an absent (or out-of-tenant) entity.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

pub type DomariResult<T> = Result<T, DomariError>;
