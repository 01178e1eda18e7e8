use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use domari_core::error::DomariError;
use serde::Deserialize;

use crate::error::ApiError;
use crate::extract::Caller;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// `GET /analytics/export/{entity}` — CSV download.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Path(entity): Path<String>,
    Query(range): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let exporter = state.export();
    let csv = match entity.as_str() {
        "invoices" => exporter.export_invoices(&ctx, range.from, range.to).await?,
        "properties" => exporter.export_properties(&ctx, range.from, range.to).await?,
        "work-orders" => exporter.export_work_orders(&ctx, range.from, range.to).await?,
        other => return Err(DomariError::not_found("export", other).into()),
    };

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", csv.filename),
        ),
    ];
    Ok((headers, csv.content))
}
