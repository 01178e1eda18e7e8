//! HTTP implementation of the payment collaborator.
//!
//! Posts JSON to the configured payments endpoint. Any transport or
//! protocol failure surfaces as `ExternalService`; no invoice state is
//! touched here.

use domari_core::error::{DomariError, DomariResult};
use domari_service::payments::{PaymentGateway, PaymentLinkRequest};
use serde::{Deserialize, Serialize};

#[derive(Clone)]
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct LinkBody<'a> {
    amount: u64,
    currency: &'static str,
    description: &'a str,
    payer_email: &'a str,
    reference_id: &'a str,
    success_url: &'a str,
}

#[derive(Serialize)]
struct PortalBody<'a> {
    customer: &'a str,
    return_url: &'a str,
}

#[derive(Deserialize)]
struct UrlResponse {
    url: String,
}

fn unavailable(err: impl std::fmt::Display) -> DomariError {
    DomariError::ExternalService {
        service: "payments".into(),
        reason: err.to_string(),
    }
}

impl HttpPaymentGateway {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    async fn post_for_url<B: Serialize>(&self, path: &str, body: &B) -> DomariResult<String> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            return Err(unavailable(format!("unexpected status {}", response.status())));
        }

        let parsed: UrlResponse = response.json().await.map_err(unavailable)?;
        Ok(parsed.url)
    }
}

impl PaymentGateway for HttpPaymentGateway {
    async fn create_payment_link(&self, request: PaymentLinkRequest) -> DomariResult<String> {
        self.post_for_url(
            "/payment-links",
            &LinkBody {
                amount: request.amount_minor_units,
                currency: "usd",
                description: &request.description,
                payer_email: &request.payer_email,
                reference_id: &request.reference_id,
                success_url: &request.success_url,
            },
        )
        .await
    }

    async fn create_portal_session(&self, customer_ref: &str, return_url: &str) -> DomariResult<String> {
        self.post_for_url(
            "/portal-sessions",
            &PortalBody {
                customer: customer_ref,
                return_url,
            },
        )
        .await
    }
}
