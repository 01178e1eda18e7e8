//! Router assembly.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post};

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        // Properties
        .route(
            "/properties",
            get(handlers::properties::list).post(handlers::properties::create),
        )
        .route("/properties/{id}", get(handlers::properties::get))
        .route("/properties/{id}/status", patch(handlers::properties::set_status))
        // Occupants
        .route(
            "/occupants",
            get(handlers::occupants::list).post(handlers::occupants::create),
        )
        .route("/occupants/{id}", get(handlers::occupants::get))
        // Organization members
        .route("/users", get(handlers::users::list))
        // Service providers
        .route(
            "/service-providers",
            get(handlers::providers::list).post(handlers::providers::create),
        )
        .route("/service-providers/{id}", get(handlers::providers::get))
        // Invoices
        .route(
            "/invoices",
            get(handlers::invoices::list).post(handlers::invoices::create),
        )
        .route("/invoices/{id}", get(handlers::invoices::get))
        .route("/invoices/{id}/payments", post(handlers::invoices::record_payment))
        .route(
            "/invoices/{id}/payment-link",
            post(handlers::invoices::issue_payment_link),
        )
        .route("/invoices/{id}/void", post(handlers::invoices::void))
        // Work orders
        .route(
            "/work-orders",
            get(handlers::work_orders::list).post(handlers::work_orders::create),
        )
        .route("/work-orders/{id}", get(handlers::work_orders::get))
        .route(
            "/work-orders/{id}/transitions",
            post(handlers::work_orders::transition),
        )
        .route("/work-orders/{id}/updates", get(handlers::work_orders::updates))
        // Messaging
        .route(
            "/messages",
            get(handlers::messages::list).post(handlers::messages::send),
        )
        .route("/messages/read", patch(handlers::messages::mark_read))
        .route("/notifications", get(handlers::notifications::list))
        .route(
            "/notifications/{id}/read",
            patch(handlers::notifications::mark_read),
        )
        // Audit trail
        .route("/audit-log", get(handlers::audit::list))
        // Billing
        .route("/billing/status", get(handlers::billing::status))
        .route("/billing/portal", post(handlers::billing::portal))
        .route("/billing/rent-payment", post(handlers::billing::rent_payment))
        // Exports
        .route("/analytics/export/{entity}", get(handlers::export::export))
        .with_state(state)
}
