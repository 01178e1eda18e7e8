//! Bearer-token extraction: one identity resolution per request.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use domari_core::context::AuthContext;
use domari_core::error::DomariError;

use crate::error::ApiError;
use crate::state::AppState;

/// The resolved caller. Handlers take `Caller(ctx)` and never see the
/// raw token.
pub struct Caller(pub AuthContext);

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .ok_or(DomariError::AuthenticationFailed {
                reason: "missing bearer token".into(),
            })?;

        let ctx = state.identity().resolve(token).await?;
        Ok(Caller(ctx))
    }
}
