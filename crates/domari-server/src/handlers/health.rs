use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domari_core::error::DomariError;

use crate::error::{ApiError, Envelope, ok};
use crate::state::AppState;

/// Liveness probe; round-trips the database connection.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Envelope<&'static str>>, ApiError> {
    state.db().health().await.map_err(DomariError::from)?;
    Ok(ok("ok"))
}
