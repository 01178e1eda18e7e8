//! Property domain model.
//!
//! Properties are soft-retired by moving them to `OffMarket`; rows are
//! never hard-deleted so operational history survives.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyStatus {
    Available,
    Occupied,
    Maintenance,
    Renovation,
    OffMarket,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "Available",
            PropertyStatus::Occupied => "Occupied",
            PropertyStatus::Maintenance => "Maintenance",
            PropertyStatus::Renovation => "Renovation",
            PropertyStatus::OffMarket => "OffMarket",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Available" => Some(PropertyStatus::Available),
            "Occupied" => Some(PropertyStatus::Occupied),
            "Maintenance" => Some(PropertyStatus::Maintenance),
            "Renovation" => Some(PropertyStatus::Renovation),
            "OffMarket" => Some(PropertyStatus::OffMarket),
            _ => None,
        }
    }

    /// Retired properties do not count against the plan quota.
    pub fn is_active(&self) -> bool {
        !matches!(self, PropertyStatus::OffMarket)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    SingleFamily,
    MultiFamily,
    Apartment,
    Condo,
    Commercial,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::SingleFamily => "SingleFamily",
            PropertyType::MultiFamily => "MultiFamily",
            PropertyType::Apartment => "Apartment",
            PropertyType::Condo => "Condo",
            PropertyType::Commercial => "Commercial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SingleFamily" => Some(PropertyType::SingleFamily),
            "MultiFamily" => Some(PropertyType::MultiFamily),
            "Apartment" => Some(PropertyType::Apartment),
            "Condo" => Some(PropertyType::Condo),
            "Commercial" => Some(PropertyType::Commercial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub monthly_rent: Decimal,
    pub purchase_price: Option<Decimal>,
    pub amenities: Vec<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProperty {
    pub name: String,
    pub address_line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub property_type: PropertyType,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub square_feet: Option<u32>,
    pub year_built: Option<u32>,
    pub monthly_rent: Decimal,
    pub purchase_price: Option<Decimal>,
    pub amenities: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProperty {
    pub name: Option<String>,
    pub monthly_rent: Option<Decimal>,
    pub amenities: Option<Vec<String>>,
}

/// Entity-specific list filters, combined with AND against any search
/// clause.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub property_type: Option<PropertyType>,
}
