//! Audit log domain model.
//!
//! Append-only: entries are never mutated or deleted by normal
//! operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    Create,
    Update,
    StatusChange,
    PaymentRecorded,
    PaymentLinkIssued,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "Create",
            AuditAction::Update => "Update",
            AuditAction::StatusChange => "StatusChange",
            AuditAction::PaymentRecorded => "PaymentRecorded",
            AuditAction::PaymentLinkIssued => "PaymentLinkIssued",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Create" => Some(AuditAction::Create),
            "Update" => Some(AuditAction::Update),
            "StatusChange" => Some(AuditAction::StatusChange),
            "PaymentRecorded" => Some(AuditAction::PaymentRecorded),
            "PaymentLinkIssued" => Some(AuditAction::PaymentLinkIssued),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Uuid,
    /// Structured diff or snapshot of the mutation.
    pub changes: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAuditLogEntry {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub changes: serde_json::Value,
}
