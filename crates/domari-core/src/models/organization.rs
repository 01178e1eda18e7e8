//! Organization domain model.
//!
//! Organizations are the multi-tenancy boundary: every other entity is
//! partitioned by its organization, and the subscription plan hangs off
//! the organization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subscription plan tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Starter,
    Professional,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Starter => "Starter",
            Plan::Professional => "Professional",
            Plan::Enterprise => "Enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Starter" => Some(Plan::Starter),
            "Professional" => Some(Plan::Professional),
            "Enterprise" => Some(Plan::Enterprise),
            _ => None,
        }
    }

    /// Quota ceilings for the plan. `None` means no ceiling.
    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Starter => PlanLimits {
                max_properties: Some(20),
                max_users: Some(5),
            },
            Plan::Professional => PlanLimits {
                max_properties: Some(100),
                max_users: Some(25),
            },
            Plan::Enterprise => PlanLimits {
                max_properties: None,
                max_users: None,
            },
        }
    }
}

/// Per-plan quota ceilings. Unlimited is represented as `None`, never
/// as a sentinel integer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanLimits {
    pub max_properties: Option<u64>,
    pub max_users: Option<u64>,
}

/// Billing state of the subscription, as reported by the billing
/// collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanStatus {
    Trialing,
    Active,
    PastDue,
    Canceled,
    Unpaid,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Trialing => "Trialing",
            PlanStatus::Active => "Active",
            PlanStatus::PastDue => "PastDue",
            PlanStatus::Canceled => "Canceled",
            PlanStatus::Unpaid => "Unpaid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Trialing" => Some(PlanStatus::Trialing),
            "Active" => Some(PlanStatus::Active),
            "PastDue" => Some(PlanStatus::PastDue),
            "Canceled" => Some(PlanStatus::Canceled),
            "Unpaid" => Some(PlanStatus::Unpaid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    /// Globally unique, immutable once assigned.
    pub subdomain: String,
    pub plan: Plan,
    pub plan_status: PlanStatus,
    /// Customer reference at the payment collaborator.
    pub billing_customer_ref: Option<String>,
    pub billing_subscription_ref: Option<String>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub current_period_ends_at: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub plan: Plan,
}

/// Derive the unique subdomain from an organization name: lower-case,
/// alphanumerics kept, runs of anything else collapsed to one hyphen.
pub fn derive_subdomain(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
