//! SurrealDB repository implementations for the `domari-core` traits.
//!
//! Every row type is an explicit struct mapped field-by-field into the
//! domain model, so schema drift fails here rather than deep inside
//! business logic.

mod audit;
mod invoice;
mod message;
mod notification;
mod occupant;
mod organization;
mod property;
mod service_provider;
mod session;
mod user;
mod work_order;

pub use audit::SurrealAuditLogRepository;
pub use invoice::SurrealInvoiceRepository;
pub use message::SurrealMessageRepository;
pub use notification::SurrealNotificationRepository;
pub use occupant::SurrealOccupantRepository;
pub use organization::SurrealOrganizationRepository;
pub use property::SurrealPropertyRepository;
pub use service_provider::SurrealServiceProviderRepository;
pub use session::SurrealSessionRepository;
pub use user::SurrealUserRepository;
pub use work_order::SurrealWorkOrderRepository;

use std::str::FromStr;

use rust_decimal::Decimal;
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub total: u64,
}

pub(crate) fn parse_uuid(field: &str, s: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Mapping(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(field: &str, s: Option<&str>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| parse_uuid(field, v)).transpose()
}

pub(crate) fn parse_money(field: &str, s: &str) -> Result<Decimal, DbError> {
    Decimal::from_str(s).map_err(|e| DbError::Mapping(format!("invalid {field} amount: {e}")))
}

pub(crate) fn parse_opt_money(field: &str, s: Option<&str>) -> Result<Option<Decimal>, DbError> {
    s.map(|v| parse_money(field, v)).transpose()
}

/// Fail the mapping when a stored enum string is not recognized.
pub(crate) fn parse_enum<T>(
    field: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, DbError> {
    parse(value).ok_or_else(|| DbError::Mapping(format!("unknown {field}: {value}")))
}
