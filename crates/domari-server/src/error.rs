//! HTTP error mapping and the uniform response envelope.
//!
//! Every response is `{"data": ..., "error": null}` or
//! `{"data": null, "error": "<message>"}`. Store and internal failures
//! are logged with full detail but reported to the client generically.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domari_core::error::DomariError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Successful response body.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        data: Some(data),
        error: None,
    })
}

/// A [`DomariError`] on its way out as HTTP.
#[derive(Debug)]
pub struct ApiError(pub DomariError);

impl From<DomariError> for ApiError {
    fn from(err: DomariError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomariError::AuthenticationFailed { .. } => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            DomariError::AuthorizationDenied { reason } => {
                (StatusCode::FORBIDDEN, reason.clone())
            }
            DomariError::Validation { message } => (StatusCode::BAD_REQUEST, message.clone()),
            DomariError::NotFound { entity, .. } => {
                (StatusCode::NOT_FOUND, format!("{entity} not found"))
            }
            DomariError::QuotaExceeded { resource, limit } => (
                StatusCode::PAYMENT_REQUIRED,
                format!("plan limit reached for {resource} (limit {limit})"),
            ),
            DomariError::ExternalService { service, reason } => {
                error!(service = %service, reason = %reason, "external service failure");
                (
                    StatusCode::BAD_GATEWAY,
                    format!("{service} is currently unavailable"),
                )
            }
            DomariError::Database(detail) => {
                error!(detail = %detail, "database failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
            DomariError::Internal(detail) => {
                error!(detail = %detail, "internal failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
            }
        };

        let body = Json(Envelope::<()> {
            data: None,
            error: Some(message),
        });
        (status, body).into_response()
    }
}
