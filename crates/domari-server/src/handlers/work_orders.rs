use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use domari_core::models::work_order::{
    Assignee, CreateWorkOrder, WorkOrder, WorkOrderFilter, WorkOrderStatus, WorkOrderUpdate,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use domari_service::work_orders::TransitionRequest;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(filter): Query<WorkOrderFilter>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<WorkOrder>>>, ApiError> {
    let result = state
        .work_orders()
        .list(&ctx, filter, query.normalize())
        .await?;
    Ok(ok(result.into()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(input): Json<CreateWorkOrder>,
) -> Result<Json<Envelope<WorkOrder>>, ApiError> {
    let order = state.work_orders().create(&ctx, input).await?;
    Ok(ok(order))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<WorkOrder>>, ApiError> {
    let order = state.work_orders().get(&ctx, id).await?;
    Ok(ok(order))
}

#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub to: WorkOrderStatus,
    pub message: String,
    pub assigned_to: Option<Assignee>,
    pub actual_cost: Option<Decimal>,
    #[serde(default)]
    pub image_refs: Vec<String>,
}

pub async fn transition(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<Envelope<WorkOrder>>, ApiError> {
    let order = state
        .work_orders()
        .transition(
            &ctx,
            id,
            TransitionRequest {
                to: body.to,
                message: body.message,
                assigned_to: body.assigned_to,
                actual_cost: body.actual_cost,
                image_refs: body.image_refs,
            },
        )
        .await?;
    Ok(ok(order))
}

pub async fn updates(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Vec<WorkOrderUpdate>>>, ApiError> {
    let history = state.work_orders().updates(&ctx, id).await?;
    Ok(ok(history))
}
