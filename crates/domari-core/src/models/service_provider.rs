//! Service provider domain model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::work_order::WorkOrderCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityStatus {
    Available,
    Busy,
    Unavailable,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Available => "Available",
            AvailabilityStatus::Busy => "Busy",
            AvailabilityStatus::Unavailable => "Unavailable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(AvailabilityStatus::Available),
            "Busy" => Some(AvailabilityStatus::Busy),
            "Unavailable" => Some(AvailabilityStatus::Unavailable),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialties: Vec<WorkOrderCategory>,
    pub availability_status: AvailabilityStatus,
    pub hourly_rate: Option<Decimal>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceProvider {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialties: Vec<WorkOrderCategory>,
    pub hourly_rate: Option<Decimal>,
}
