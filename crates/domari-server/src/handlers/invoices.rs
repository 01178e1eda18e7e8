use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use domari_core::models::invoice::{CreateInvoice, Invoice, InvoiceFilter};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(filter): Query<InvoiceFilter>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<Invoice>>>, ApiError> {
    let result = state.invoices().list(&ctx, filter, query.normalize()).await?;
    Ok(ok(result.into()))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(input): Json<CreateInvoice>,
) -> Result<Json<Envelope<Invoice>>, ApiError> {
    let invoice = state.invoices().create(&ctx, input).await?;
    Ok(ok(invoice))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Invoice>>, ApiError> {
    let invoice = state.invoices().get(&ctx, id).await?;
    Ok(ok(invoice))
}

#[derive(Debug, Deserialize)]
pub struct PaymentBody {
    pub amount: Decimal,
    pub paid_on: Option<DateTime<Utc>>,
}

pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<PaymentBody>,
) -> Result<Json<Envelope<Invoice>>, ApiError> {
    let invoice = state
        .invoices()
        .record_payment(&ctx, id, body.amount, body.paid_on)
        .await?;
    Ok(ok(invoice))
}

#[derive(Debug, Deserialize)]
pub struct PaymentLinkBody {
    pub success_url: String,
}

pub async fn issue_payment_link(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
    Json(body): Json<PaymentLinkBody>,
) -> Result<Json<Envelope<Invoice>>, ApiError> {
    let invoice = state
        .invoices()
        .issue_payment_link(&ctx, id, body.success_url)
        .await?;
    Ok(ok(invoice))
}

pub async fn void(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<Invoice>>, ApiError> {
    let invoice = state.invoices().void(&ctx, id).await?;
    Ok(ok(invoice))
}
