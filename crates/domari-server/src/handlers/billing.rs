use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use domari_core::context::{Role, require_role};
use domari_core::error::DomariError;
use domari_core::models::invoice::Invoice;
use domari_core::repository::OrganizationRepository;
use domari_service::payments::PaymentGateway;
use domari_service::plan::BillingStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, Envelope, ok};
use crate::extract::Caller;
use crate::state::AppState;

const BILLING_ADMIN_ROLES: &[Role] = &[Role::OrgAdmin, Role::Accountant];

/// Plan, billing state, and per-resource usage for the caller's
/// organization.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
) -> Result<Json<Envelope<BillingStatus>>, ApiError> {
    let status = state.plan_gate().billing_status(&ctx).await?;
    Ok(ok(status))
}

#[derive(Debug, Deserialize)]
pub struct PortalBody {
    pub return_url: String,
}

#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub url: String,
}

/// Hosted subscription-management session at the payment collaborator.
pub async fn portal(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(body): Json<PortalBody>,
) -> Result<Json<Envelope<PortalResponse>>, ApiError> {
    require_role(&ctx, BILLING_ADMIN_ROLES)?;

    let org = state.organizations().get_by_id(ctx.organization_id).await?;
    let customer_ref = org.billing_customer_ref.ok_or_else(|| {
        DomariError::validation("organization has no billing customer on file")
    })?;

    let url = state
        .payment_gateway()
        .create_portal_session(&customer_ref, &body.return_url)
        .await?;
    Ok(ok(PortalResponse { url }))
}

#[derive(Debug, Deserialize)]
pub struct RentPaymentBody {
    pub invoice_id: Uuid,
    pub success_url: String,
}

/// Hosted payment link for one outstanding invoice.
pub async fn rent_payment(
    State(state): State<Arc<AppState>>,
    Caller(ctx): Caller,
    Json(body): Json<RentPaymentBody>,
) -> Result<Json<Envelope<Invoice>>, ApiError> {
    let invoice = state
        .invoices()
        .issue_payment_link(&ctx, body.invoice_id, body.success_url)
        .await?;
    Ok(ok(invoice))
}
