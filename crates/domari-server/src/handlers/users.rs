use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use domari_core::models::user::User;
use domari_core::repository::UserRepository;

use super::{ListQuery, Paged};
use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

/// Every member of the caller's organization; open to all roles so the
/// messaging UI can pick recipients.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<Paged<User>>>, ApiError> {
    let result = state
        .users()
        .list(ctx.organization_id, query.normalize())
        .await?;
    Ok(ok(result.into()))
}
