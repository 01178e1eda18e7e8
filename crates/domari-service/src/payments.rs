//! Payment collaborator seam.
//!
//! The gateway is opaque: it turns a link request into a hosted URL or
//! fails as `ExternalService`, and nothing here ever touches invoice
//! state.

use domari_core::error::{DomariError, DomariResult};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Request for a hosted payment link.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    /// Amount in minor units (cents).
    pub amount_minor_units: u64,
    pub description: String,
    pub payer_email: String,
    /// Invoice id, echoed back by the collaborator's webhooks.
    pub reference_id: String,
    pub success_url: String,
}

/// Hosted-payments collaborator.
pub trait PaymentGateway: Send + Sync {
    fn create_payment_link(
        &self,
        request: PaymentLinkRequest,
    ) -> impl Future<Output = DomariResult<String>> + Send;

    fn create_portal_session(
        &self,
        customer_ref: &str,
        return_url: &str,
    ) -> impl Future<Output = DomariResult<String>> + Send;
}

/// Convert a non-negative money amount into minor units.
pub fn to_minor_units(amount: Decimal) -> DomariResult<u64> {
    (amount * Decimal::ONE_HUNDRED)
        .round()
        .to_u64()
        .ok_or_else(|| {
            DomariError::validation(format!("amount {amount} cannot be charged"))
        })
}
