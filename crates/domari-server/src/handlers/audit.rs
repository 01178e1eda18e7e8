use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use domari_core::context::{Role, require_role};
use domari_core::models::audit::AuditLogEntry;
use domari_core::repository::AuditLogRepository;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

/// The organization's audit trail, newest first. Admin only.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<AuditLogEntry>>>, ApiError> {
    require_role(&ctx, &[Role::OrgAdmin])?;
    let result = state
        .audit_log()
        .list(ctx.organization_id, query.normalize())
        .await?;
    Ok(ok(result.into()))
}
