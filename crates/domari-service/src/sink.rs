//! Fire-and-forget audit and notification sinks.
//!
//! The primary mutation is already committed by the time a sink runs;
//! a sink failure is logged at `warn` and never surfaces to the
//! caller. A successful write with a missing audit record is an
//! accepted, observable state.

use domari_core::context::AuthContext;
use domari_core::models::audit::{AuditAction, CreateAuditLogEntry};
use domari_core::models::notification::{CreateNotification, NotificationKind};
use domari_core::repository::{AuditLogRepository, NotificationRepository};
use tracing::warn;
use uuid::Uuid;

/// Append-only audit trail writer.
pub struct AuditSink<A: AuditLogRepository> {
    repo: A,
}

impl<A: AuditLogRepository> AuditSink<A> {
    pub fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Record one mutation. Exactly one attempt; never fails the
    /// caller.
    pub async fn record(
        &self,
        ctx: &AuthContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: Uuid,
        changes: serde_json::Value,
    ) {
        let entry = CreateAuditLogEntry {
            organization_id: ctx.organization_id,
            user_id: ctx.user_id,
            action,
            entity_type: entity_type.to_string(),
            entity_id,
            changes,
        };
        if let Err(err) = self.repo.append(entry).await {
            warn!(
                entity_type,
                entity_id = %entity_id,
                action = action.as_str(),
                error = %err,
                "audit write failed"
            );
        }
    }
}

/// In-app notification writer.
pub struct NotificationSink<N: NotificationRepository> {
    repo: N,
}

impl<N: NotificationRepository> NotificationSink<N> {
    pub fn new(repo: N) -> Self {
        Self { repo }
    }

    /// Deliver one notification to a user. Never fails the caller.
    pub async fn notify(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        kind: NotificationKind,
        payload: serde_json::Value,
    ) {
        let input = CreateNotification {
            organization_id,
            user_id,
            kind,
            payload,
        };
        if let Err(err) = self.repo.create(input).await {
            warn!(
                user_id = %user_id,
                kind = kind.as_str(),
                error = %err,
                "notification write failed"
            );
        }
    }
}
