//! Direct messaging and in-app notifications.

use domari_core::context::AuthContext;
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::message::{CreateMessage, Message};
use domari_core::models::notification::{Notification, NotificationKind};
use domari_core::query::Page;
use domari_core::repository::{
    MessageRepository, NotificationRepository, PaginatedResult, UserRepository,
};
use uuid::Uuid;

use crate::sink::NotificationSink;

pub struct MessagingService<M, U, N>
where
    M: MessageRepository,
    U: UserRepository,
    N: NotificationRepository,
{
    messages: M,
    users: U,
    notifications: NotificationSink<N>,
}

impl<M, U, N> MessagingService<M, U, N>
where
    M: MessageRepository,
    U: UserRepository,
    N: NotificationRepository,
{
    pub fn new(messages: M, users: U, notifications: NotificationSink<N>) -> Self {
        Self {
            messages,
            users,
            notifications,
        }
    }

    /// Send a message to another user in the same organization.
    pub async fn send(&self, ctx: &AuthContext, input: CreateMessage) -> DomariResult<Message> {
        if input.subject.trim().is_empty() || input.body.trim().is_empty() {
            return Err(DomariError::validation("subject and body must not be empty"));
        }
        if input.recipient_id == ctx.user_id {
            return Err(DomariError::validation("cannot send a message to yourself"));
        }
        // Scoped lookup: a recipient outside the organization fails as
        // NotFound.
        self.users
            .get_in_org(ctx.organization_id, input.recipient_id)
            .await?;

        let message = self
            .messages
            .create(ctx.organization_id, ctx.user_id, input)
            .await?;

        self.notifications
            .notify(
                ctx.organization_id,
                message.recipient_id,
                NotificationKind::MessageReceived,
                serde_json::json!({
                    "message_id": message.id,
                    "sender": ctx.full_name,
                    "subject": message.subject,
                }),
            )
            .await;

        Ok(message)
    }

    /// Inbox and sent mail for the caller, newest first.
    pub async fn list(&self, ctx: &AuthContext, page: Page) -> DomariResult<PaginatedResult<Message>> {
        self.messages
            .list_for_user(ctx.organization_id, ctx.user_id, page)
            .await
    }

    /// Mark a set of received messages read. Idempotent; returns how
    /// many matched.
    pub async fn mark_read(&self, ctx: &AuthContext, ids: Vec<Uuid>) -> DomariResult<u64> {
        self.messages
            .mark_read(ctx.organization_id, ctx.user_id, ids)
            .await
    }
}

/// Read side of the notification stream.
pub struct NotificationService<N: NotificationRepository> {
    notifications: N,
}

impl<N: NotificationRepository> NotificationService<N> {
    pub fn new(notifications: N) -> Self {
        Self { notifications }
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        page: Page,
    ) -> DomariResult<PaginatedResult<Notification>> {
        self.notifications
            .list_for_user(ctx.organization_id, ctx.user_id, page)
            .await
    }

    pub async fn mark_read(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<()> {
        self.notifications
            .mark_read(ctx.organization_id, ctx.user_id, id)
            .await
    }
}
