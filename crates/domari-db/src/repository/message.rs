//! SurrealDB implementation of [`MessageRepository`].

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::message::{CreateMessage, Message};
use domari_core::query::Page;
use domari_core::repository::{MessageRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct MessageRow {
    record_id: String,
    organization_id: String,
    sender_id: String,
    recipient_id: String,
    subject: String,
    body: String,
    thread_id: Option<String>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn try_into_message(self) -> Result<Message, DbError> {
        Ok(Message {
            id: parse_uuid("message", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            sender_id: parse_uuid("sender", &self.sender_id)?,
            recipient_id: parse_uuid("recipient", &self.recipient_id)?,
            subject: self.subject,
            body: self.body,
            thread_id: parse_opt_uuid("thread", self.thread_id.as_deref())?,
            is_read: self.is_read,
            created_at: self.created_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

/// SurrealDB implementation of the Message repository.
#[derive(Clone)]
pub struct SurrealMessageRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMessageRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MessageRepository for SurrealMessageRepository<C> {
    async fn create(
        &self,
        org_id: Uuid,
        sender_id: Uuid,
        input: CreateMessage,
    ) -> DomariResult<Message> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('message', $id) SET \
                 organization_id = $org, \
                 sender_id = $sender_id, \
                 recipient_id = $recipient_id, \
                 subject = $subject, body = $body, \
                 thread_id = $thread_id, \
                 is_read = false",
            )
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .bind(("sender_id", sender_id.to_string()))
            .bind(("recipient_id", input.recipient_id.to_string()))
            .bind(("subject", input.subject))
            .bind(("body", input.body))
            .bind(("thread_id", input.thread_id.map(|t| t.to_string())))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('message', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MessageRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "message".into(),
            id: id_str,
        })?;

        Ok(row.try_into_message()?)
    }

    async fn list_for_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        page: Page,
    ) -> DomariResult<PaginatedResult<Message>> {
        // Inbox and sent mail in one stream, newest first.
        let where_clause = "organization_id = $org \
             AND (recipient_id = $user OR sender_id = $user)";

        let mut count_result = self
            .db
            .query(format!(
                "SELECT count() AS total FROM message \
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
                "SELECT {SELECT_FIELDS} FROM message \
                 WHERE {where_clause} \
                 ORDER BY created_at DESC LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("user", user_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MessageRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_message())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn mark_read(
        &self,
        org_id: Uuid,
        recipient_id: Uuid,
        ids: Vec<Uuid>,
    ) -> DomariResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();

        // Scoped to the recipient: nobody marks someone else's inbox.
        let mut result = self
            .db
            .query(
                "UPDATE message SET is_read = true \
                 WHERE organization_id = $org \
                 AND recipient_id = $recipient \
                 AND meta::id(id) IN $ids \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("org", org_id.to_string()))
            .bind(("recipient", recipient_id.to_string()))
            .bind(("ids", ids))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MessageRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
