//! Notification domain model.
//!
//! Notifications are generated by the engines as side effects (message
//! received, work order assigned, invoice overdue), never created
//! directly by users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    MessageReceived,
    WorkOrderAssigned,
    InvoiceOverdue,
    PaymentRecorded,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::MessageReceived => "MessageReceived",
            NotificationKind::WorkOrderAssigned => "WorkOrderAssigned",
            NotificationKind::InvoiceOverdue => "InvoiceOverdue",
            NotificationKind::PaymentRecorded => "PaymentRecorded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MessageReceived" => Some(NotificationKind::MessageReceived),
            "WorkOrderAssigned" => Some(NotificationKind::WorkOrderAssigned),
            "InvoiceOverdue" => Some(NotificationKind::InvoiceOverdue),
            "PaymentRecorded" => Some(NotificationKind::PaymentRecorded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub kind: NotificationKind,
    pub payload: serde_json::Value,
}
