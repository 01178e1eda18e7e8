//! Work order lifecycle engine.
//!
//! Transition legality lives in the status state machine in core;
//! this service enforces the per-transition requirements (message,
//! assignee, completion fields), persists the history entry, and
//! fans out to the sinks.

use chrono::{DateTime, Utc};
use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::audit::AuditAction;
use domari_core::models::notification::NotificationKind;
use domari_core::models::work_order::{
    Assignee, CreateWorkOrder, WorkOrder, WorkOrderFilter, WorkOrderStatus, WorkOrderUpdate,
};
use domari_core::query::Page;
use domari_core::repository::{
    AuditLogRepository, NotificationRepository, PaginatedResult, WorkOrderRepository,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::sink::{AuditSink, NotificationSink};

const MAINTENANCE_ROLES: &[Role] = &[Role::OrgAdmin, Role::PropertyManager, Role::Maintenance];

/// Retry budget for the optimistic transition update.
const TRANSITION_RETRIES: usize = 3;

/// A requested status transition.
#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub to: WorkOrderStatus,
    /// Required, user-facing; becomes the history entry.
    pub message: String,
    /// Required for `Open → Assigned`, forbidden elsewhere.
    pub assigned_to: Option<Assignee>,
    /// Only accepted when entering `Completed`.
    pub actual_cost: Option<Decimal>,
    /// Only accepted when entering `Completed`.
    pub image_refs: Vec<String>,
}

pub struct WorkOrderService<W, A, N>
where
    W: WorkOrderRepository,
    A: AuditLogRepository,
    N: NotificationRepository,
{
    work_orders: W,
    audit: AuditSink<A>,
    notifications: NotificationSink<N>,
}

impl<W, A, N> WorkOrderService<W, A, N>
where
    W: WorkOrderRepository,
    A: AuditLogRepository,
    N: NotificationRepository,
{
    pub fn new(work_orders: W, audit: AuditSink<A>, notifications: NotificationSink<N>) -> Self {
        Self {
            work_orders,
            audit,
            notifications,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: CreateWorkOrder) -> DomariResult<WorkOrder> {
        require_role(ctx, MAINTENANCE_ROLES)?;
        if input.title.trim().is_empty() {
            return Err(DomariError::validation("work order title must not be empty"));
        }

        let order = self.work_orders.create(ctx.organization_id, input).await?;

        self.audit
            .record(
                ctx,
                AuditAction::Create,
                "work_order",
                order.id,
                serde_json::json!({
                    "title": order.title,
                    "priority": order.priority.as_str(),
                }),
            )
            .await;

        Ok(order)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<WorkOrder> {
        self.work_orders.get(ctx.organization_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: WorkOrderFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<WorkOrder>> {
        self.work_orders.list(ctx.organization_id, filter, page).await
    }

    /// User-facing status history, oldest first.
    pub async fn updates(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<Vec<WorkOrderUpdate>> {
        // Scoped get first: a foreign id must fail as NotFound rather
        // than return an empty history.
        self.work_orders.get(ctx.organization_id, id).await?;
        self.work_orders.list_updates(ctx.organization_id, id).await
    }

    fn validate_request(current: &WorkOrder, req: &TransitionRequest) -> DomariResult<()> {
        if req.message.trim().is_empty() {
            return Err(DomariError::validation(
                "a status transition requires a non-empty message",
            ));
        }
        if !current.status.can_transition_to(req.to) {
            return Err(DomariError::validation(format!(
                "cannot transition a work order from {} to {}",
                current.status.as_str(),
                req.to.as_str()
            )));
        }
        match (req.to, req.assigned_to) {
            (WorkOrderStatus::Assigned, None) => {
                return Err(DomariError::validation(
                    "assigning a work order requires an assignee",
                ));
            }
            (WorkOrderStatus::Assigned, Some(_)) => {}
            (_, Some(_)) => {
                return Err(DomariError::validation(
                    "an assignee may only be set when assigning",
                ));
            }
            (_, None) => {}
        }
        if req.actual_cost.is_some() && req.to != WorkOrderStatus::Completed {
            return Err(DomariError::validation(
                "actual cost is only recorded on completion",
            ));
        }
        if !req.image_refs.is_empty() && req.to != WorkOrderStatus::Completed {
            return Err(DomariError::validation(
                "images are only attached on completion",
            ));
        }
        Ok(())
    }

    /// Apply one status transition.
    ///
    /// Optimistic: each attempt re-reads and re-validates against the
    /// fresh status, so a concurrent transition either wins cleanly or
    /// turns this request into a validation error.
    pub async fn transition(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        req: TransitionRequest,
    ) -> DomariResult<WorkOrder> {
        require_role(ctx, MAINTENANCE_ROLES)?;

        for _ in 0..TRANSITION_RETRIES {
            let current = self.work_orders.get(ctx.organization_id, id).await?;
            Self::validate_request(&current, &req)?;

            let completed_at: Option<DateTime<Utc>> =
                (req.to == WorkOrderStatus::Completed).then(Utc::now);

            let applied = self
                .work_orders
                .apply_transition(
                    ctx.organization_id,
                    id,
                    current.status,
                    req.to,
                    req.assigned_to,
                    req.actual_cost,
                    completed_at,
                )
                .await?;

            if let Some(updated) = applied {
                self.work_orders
                    .add_update(WorkOrderUpdate {
                        id: Uuid::new_v4(),
                        organization_id: ctx.organization_id,
                        work_order_id: updated.id,
                        author_id: ctx.user_id,
                        from_status: current.status,
                        to_status: req.to,
                        message: req.message.clone(),
                        image_refs: req.image_refs.clone(),
                        created_at: Utc::now(),
                    })
                    .await?;

                self.audit
                    .record(
                        ctx,
                        AuditAction::StatusChange,
                        "work_order",
                        updated.id,
                        serde_json::json!({
                            "from": current.status.as_str(),
                            "to": req.to.as_str(),
                        }),
                    )
                    .await;

                if let Some(Assignee::User(user_id)) = req.assigned_to {
                    self.notifications
                        .notify(
                            ctx.organization_id,
                            user_id,
                            NotificationKind::WorkOrderAssigned,
                            serde_json::json!({
                                "work_order_id": updated.id,
                                "title": updated.title,
                            }),
                        )
                        .await;
                }

                return Ok(updated);
            }
            // Lost the race; loop re-reads and re-validates.
        }

        Err(DomariError::validation(
            "work order was modified concurrently; retry the request",
        ))
    }
}
