//! Work order domain model and its status state machine.
//!
//! Transitions: `Open → Assigned → InProgress ↔ PendingParts`,
//! `InProgress → Completed → Closed`, with `Cancelled` reachable from
//! any non-terminal state. `Closed` and `Cancelled` are terminal.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOrderStatus {
    Open,
    Assigned,
    InProgress,
    PendingParts,
    Completed,
    Closed,
    Cancelled,
}

impl WorkOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderStatus::Open => "Open",
            WorkOrderStatus::Assigned => "Assigned",
            WorkOrderStatus::InProgress => "InProgress",
            WorkOrderStatus::PendingParts => "PendingParts",
            WorkOrderStatus::Completed => "Completed",
            WorkOrderStatus::Closed => "Closed",
            WorkOrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(WorkOrderStatus::Open),
            "Assigned" => Some(WorkOrderStatus::Assigned),
            "InProgress" => Some(WorkOrderStatus::InProgress),
            "PendingParts" => Some(WorkOrderStatus::PendingParts),
            "Completed" => Some(WorkOrderStatus::Completed),
            "Closed" => Some(WorkOrderStatus::Closed),
            "Cancelled" => Some(WorkOrderStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkOrderStatus::Closed | WorkOrderStatus::Cancelled)
    }

    /// Whether `self → to` is a legal transition.
    pub fn can_transition_to(&self, to: WorkOrderStatus) -> bool {
        use WorkOrderStatus::*;
        if to == Cancelled {
            return !self.is_terminal();
        }
        matches!(
            (self, to),
            (Open, Assigned)
                | (Assigned, InProgress)
                | (InProgress, PendingParts)
                | (PendingParts, InProgress)
                | (InProgress, Completed)
                | (Completed, Closed)
        )
    }
}

/// Trade specialty of a work order (and of service providers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkOrderCategory {
    Plumbing,
    Electrical,
    Hvac,
    Appliance,
    Structural,
    Landscaping,
    General,
}

impl WorkOrderCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkOrderCategory::Plumbing => "Plumbing",
            WorkOrderCategory::Electrical => "Electrical",
            WorkOrderCategory::Hvac => "Hvac",
            WorkOrderCategory::Appliance => "Appliance",
            WorkOrderCategory::Structural => "Structural",
            WorkOrderCategory::Landscaping => "Landscaping",
            WorkOrderCategory::General => "General",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Plumbing" => Some(WorkOrderCategory::Plumbing),
            "Electrical" => Some(WorkOrderCategory::Electrical),
            "Hvac" => Some(WorkOrderCategory::Hvac),
            "Appliance" => Some(WorkOrderCategory::Appliance),
            "Structural" => Some(WorkOrderCategory::Structural),
            "Landscaping" => Some(WorkOrderCategory::Landscaping),
            "General" => Some(WorkOrderCategory::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Critical" => Some(Priority::Critical),
            "High" => Some(Priority::High),
            "Medium" => Some(Priority::Medium),
            "Low" => Some(Priority::Low),
            _ => None,
        }
    }

    /// Sort rank for default list ordering: Critical first.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// Who a work order is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id")]
pub enum Assignee {
    User(Uuid),
    Provider(Uuid),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub property_id: Uuid,
    pub occupant_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: WorkOrderCategory,
    pub priority: Priority,
    pub status: WorkOrderStatus,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    /// Set exactly when entering `Assigned`.
    pub assigned_to: Option<Assignee>,
    pub due_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkOrder {
    pub property_id: Uuid,
    pub occupant_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub category: WorkOrderCategory,
    pub priority: Priority,
    pub estimated_cost: Option<Decimal>,
    pub due_at: Option<DateTime<Utc>>,
}

/// User-facing history entry on a work order; distinct from the audit
/// sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrderUpdate {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub work_order_id: Uuid,
    pub author_id: Uuid,
    pub from_status: WorkOrderStatus,
    pub to_status: WorkOrderStatus,
    pub message: String,
    pub image_refs: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub priority: Option<Priority>,
    pub property_id: Option<Uuid>,
}
