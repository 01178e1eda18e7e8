use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domari_core::models::notification::Notification;
use uuid::Uuid;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<Notification>>>, ApiError> {
    let result = state.notifications().list(&ctx, query.normalize()).await?;
    Ok(ok(result.into()))
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    state.notifications().mark_read(&ctx, id).await?;
    Ok(ok(()))
}
