//! SurrealDB implementation of [`AuditLogRepository`].
//!
//! The table is append-only; this repository exposes no update or
//! delete path.

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::audit::{AuditAction, AuditLogEntry, CreateAuditLogEntry};
use domari_core::query::Page;
use domari_core::repository::{AuditLogRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AuditLogRow {
    record_id: String,
    organization_id: String,
    user_id: String,
    action: String,
    entity_type: String,
    entity_id: String,
    changes: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl AuditLogRow {
    fn try_into_entry(self) -> Result<AuditLogEntry, DbError> {
        Ok(AuditLogEntry {
            id: parse_uuid("audit_log", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            action: parse_enum("audit action", &self.action, AuditAction::parse)?,
            entity_type: self.entity_type,
            entity_id: parse_uuid("entity", &self.entity_id)?,
            changes: self.changes,
            created_at: self.created_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

/// SurrealDB implementation of the audit log repository.
#[derive(Clone)]
pub struct SurrealAuditLogRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAuditLogRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AuditLogRepository for SurrealAuditLogRepository<C> {
    async fn append(&self, entry: CreateAuditLogEntry) -> DomariResult<AuditLogEntry> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('audit_log', $id) SET \
                 organization_id = $org, \
                 user_id = $user_id, \
                 action = $action, \
                 entity_type = $entity_type, \
                 entity_id = $entity_id, \
                 changes = $changes",
            )
            .bind(("id", id_str.clone()))
            .bind(("org", entry.organization_id.to_string()))
            .bind(("user_id", entry.user_id.to_string()))
            .bind(("action", entry.action.as_str().to_string()))
            .bind(("entity_type", entry.entity_type))
            .bind(("entity_id", entry.entity_id.to_string()))
            .bind(("changes", entry.changes))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('audit_log', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditLogRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "audit_log".into(),
            id: id_str,
        })?;

        Ok(row.try_into_entry()?)
    }

    async fn list(&self, org_id: Uuid, page: Page) -> DomariResult<PaginatedResult<AuditLogEntry>> {
        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM audit_log \
                 WHERE organization_id = $org GROUP ALL",
            )
            .bind(("org", org_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM audit_log \
                 WHERE organization_id = $org \
                 ORDER BY created_at DESC LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuditLogRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_entry())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }
}
