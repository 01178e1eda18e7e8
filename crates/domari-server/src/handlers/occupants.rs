use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domari_core::models::occupant::{CreateOccupant, Occupant, OccupantFilter};
use uuid::Uuid;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(filter): Query<OccupantFilter>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<Occupant>>>, ApiError> {
    let result = state
        .occupants()
        .list(&ctx, filter, query.normalize())
        .await?;
    Ok(ok(result.into()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(input): Json<CreateOccupant>,
) -> Result<Json<Envelope<Occupant>>, ApiError> {
    let occupant = state.occupants().create(&ctx, input).await?;
    Ok(ok(occupant))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Occupant>>, ApiError> {
    let occupant = state.occupants().get(&ctx, id).await?;
    Ok(ok(occupant))
}
