//! Occupant domain model.
//!
//! "Occupant" is the resident of a property — named to avoid collision
//! with the multi-tenancy sense of "tenant". The organization id is
//! denormalized onto the row so scoping never requires a join.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OccupantStatus {
    Active,
    Inactive,
    Eviction,
    Pending,
}

impl OccupantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupantStatus::Active => "Active",
            OccupantStatus::Inactive => "Inactive",
            OccupantStatus::Eviction => "Eviction",
            OccupantStatus::Pending => "Pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Active" => Some(OccupantStatus::Active),
            "Inactive" => Some(OccupantStatus::Inactive),
            "Eviction" => Some(OccupantStatus::Eviction),
            "Pending" => Some(OccupantStatus::Pending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupant {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub property_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub lease_start: DateTime<Utc>,
    pub lease_end: DateTime<Utc>,
    pub monthly_rent: Decimal,
    pub security_deposit: Decimal,
    pub status: OccupantStatus,
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOccupant {
    pub property_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub lease_start: DateTime<Utc>,
    pub lease_end: DateTime<Utc>,
    pub monthly_rent: Decimal,
    pub security_deposit: Decimal,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OccupantFilter {
    pub status: Option<OccupantStatus>,
    pub property_id: Option<Uuid>,
}
