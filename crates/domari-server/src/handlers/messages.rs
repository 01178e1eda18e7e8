use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use domari_core::models::message::{CreateMessage, Message};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<Message>>>, ApiError> {
    let result = state.messaging().list(&ctx, query.normalize()).await?;
    Ok(ok(result.into()))
}

pub async fn send(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(input): Json<CreateMessage>,
) -> Result<Json<Envelope<Message>>, ApiError> {
    let message = state.messaging().send(&ctx, input).await?;
    Ok(ok(message))
}

#[derive(Debug, Deserialize)]
pub struct MarkReadBody {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MarkReadResponse {
    pub updated: u64,
}

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(body): Json<MarkReadBody>,
) -> Result<Json<Envelope<MarkReadResponse>>, ApiError> {
    let updated = state.messaging().mark_read(&ctx, body.ids).await?;
    Ok(ok(MarkReadResponse { updated }))
}
