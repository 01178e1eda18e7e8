//! SurrealDB implementation of [`NotificationRepository`].

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::notification::{CreateNotification, Notification, NotificationKind};
use domari_core::query::Page;
use domari_core::repository::{NotificationRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NotificationRow {
    record_id: String,
    organization_id: String,
    user_id: String,
    kind: String,
    payload: serde_json::Value,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRow {
    fn try_into_notification(self) -> Result<Notification, DbError> {
        Ok(Notification {
            id: parse_uuid("notification", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            kind: parse_enum("notification kind", &self.kind, NotificationKind::parse)?,
            payload: self.payload,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

/// SurrealDB implementation of the Notification repository.
#[derive(Clone)]
pub struct SurrealNotificationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNotificationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NotificationRepository for SurrealNotificationRepository<C> {
    async fn create(&self, input: CreateNotification) -> DomariResult<Notification> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('notification', $id) SET \
                 organization_id = $org, \
                 user_id = $user_id, \
                 kind = $kind, payload = $payload, \
                 is_read = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("org", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("kind", input.kind.as_str().to_string()))
            .bind(("payload", input.payload))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('notification', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notification".into(),
            id: id_str,
        })?;

        Ok(row.try_into_notification()?)
    }

    async fn list_for_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        page: Page,
    ) -> DomariResult<PaginatedResult<Notification>> {
        let where_clause = "organization_id = $org AND user_id = $user";

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM notification \
                 WHERE {where_clause} GROUP ALL"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("user", user_id.to_string()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM notification \
                 WHERE {where_clause} \
                 ORDER BY created_at DESC LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("user", user_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NotificationRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_notification())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn mark_read(&self, org_id: Uuid, user_id: Uuid, id: Uuid) -> DomariResult<()> {
        // Idempotent; re-marking a read notification changes nothing.
        self.db
            .query(
                "UPDATE type::record('notification', $id) SET is_read = true \
                 WHERE organization_id = $org AND user_id = $user",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("user", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }
}
