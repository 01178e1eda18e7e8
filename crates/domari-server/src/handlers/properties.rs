use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domari_core::models::property::{CreateProperty, Property, PropertyFilter, PropertyStatus};
use serde::Deserialize;
use uuid::Uuid;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(filter): Query<PropertyFilter>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<Property>>>, ApiError> {
    let result = state
        .properties()
        .list(&ctx, filter, query.normalize())
        .await?;
    Ok(ok(result.into()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(input): Json<CreateProperty>,
) -> Result<Json<Envelope<Property>>, ApiError> {
    let property = state.properties().create(&ctx, input).await?;
    Ok(ok(property))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Property>>, ApiError> {
    let property = state.properties().get(&ctx, id).await?;
    Ok(ok(property))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: PropertyStatus,
}

pub async fn set_status(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Envelope<Property>>, ApiError> {
    let property = state.properties().set_status(&ctx, id, body.status).await?;
    Ok(ok(property))
}
