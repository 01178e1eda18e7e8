use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domari_core::models::service_provider::{CreateServiceProvider, ServiceProvider};
use uuid::Uuid;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<ServiceProvider>>>, ApiError> {
    let result = state.providers().list(&ctx, query.normalize()).await?;
    Ok(ok(result.into()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(input): Json<CreateServiceProvider>,
) -> Result<Json<Envelope<ServiceProvider>>, ApiError> {
    let provider = state.providers().create(&ctx, input).await?;
    Ok(ok(provider))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ServiceProvider>>, ApiError> {
    let provider = state.providers().get(&ctx, id).await?;
    Ok(ok(provider))
}
