//! Domari application services.
//!
//! Request-scoped orchestration over the `domari-core` repository
//! traits: identity resolution, the property/invoice/work-order
//! engines, messaging, audit and notification sinks, the plan gate,
//! tabular export, and the payment-gateway seam.
//!
//! Services are generic over the repository traits so this crate has
//! no database dependency; the server wires in the SurrealDB
//! implementations, tests wire in whatever they need.

pub mod export;
pub mod identity;
pub mod invoices;
pub mod messaging;
pub mod occupants;
pub mod payments;
pub mod plan;
pub mod properties;
pub mod providers;
pub mod sink;
pub mod work_orders;
