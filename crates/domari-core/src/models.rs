//! Domain models for Domari.
//!
//! Every tenant-owned entity carries an `organization_id`; all reads
//! and writes are filtered on it by the repository layer.

pub mod audit;
pub mod invoice;
pub mod message;
pub mod notification;
pub mod occupant;
pub mod organization;
pub mod property;
pub mod service_provider;
pub mod session;
pub mod user;
pub mod work_order;
