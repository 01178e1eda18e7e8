//! Property engine — plan-gated creation and lifecycle updates.

use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::DomariResult;
use domari_core::models::audit::AuditAction;
use domari_core::models::property::{
    CreateProperty, Property, PropertyFilter, PropertyStatus, UpdateProperty,
};
use domari_core::query::Page;
use domari_core::repository::{
    AuditLogRepository, OrganizationRepository, PaginatedResult, PropertyRepository,
    UserRepository,
};
use uuid::Uuid;

use crate::plan::{PlanGate, Resource};
use crate::sink::AuditSink;

const MANAGE_ROLES: &[Role] = &[Role::OrgAdmin, Role::PropertyManager];

pub struct PropertyService<P, O, U, A>
where
    P: PropertyRepository,
    O: OrganizationRepository,
    U: UserRepository,
    A: AuditLogRepository,
{
    properties: P,
    plan_gate: PlanGate<O, P, U>,
    audit: AuditSink<A>,
}

impl<P, O, U, A> PropertyService<P, O, U, A>
where
    P: PropertyRepository,
    O: OrganizationRepository,
    U: UserRepository,
    A: AuditLogRepository,
{
    pub fn new(properties: P, plan_gate: PlanGate<O, P, U>, audit: AuditSink<A>) -> Self {
        Self {
            properties,
            plan_gate,
            audit,
        }
    }

    /// Create a property. The plan quota is checked before any row is
    /// written.
    pub async fn create(&self, ctx: &AuthContext, input: CreateProperty) -> DomariResult<Property> {
        require_role(ctx, MANAGE_ROLES)?;
        self.plan_gate
            .check_quota(ctx.organization_id, Resource::Properties)
            .await?;

        let property = self
            .properties
            .create(ctx.organization_id, ctx.user_id, input)
            .await?;

        self.audit
            .record(
                ctx,
                AuditAction::Create,
                "property",
                property.id,
                serde_json::json!({ "name": property.name }),
            )
            .await;

        Ok(property)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<Property> {
        self.properties.get(ctx.organization_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: PropertyFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<Property>> {
        self.properties.list(ctx.organization_id, filter, page).await
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        input: UpdateProperty,
    ) -> DomariResult<Property> {
        require_role(ctx, MANAGE_ROLES)?;
        let changes = serde_json::to_value(&input).unwrap_or_default();
        let property = self.properties.update(ctx.organization_id, id, input).await?;

        self.audit
            .record(ctx, AuditAction::Update, "property", property.id, changes)
            .await;

        Ok(property)
    }

    /// Lifecycle status change. `OffMarket` is the soft retirement
    /// state; there is no hard deletion.
    pub async fn set_status(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        status: PropertyStatus,
    ) -> DomariResult<Property> {
        require_role(ctx, MANAGE_ROLES)?;
        let previous = self.properties.get(ctx.organization_id, id).await?;
        let property = self
            .properties
            .set_status(ctx.organization_id, id, status)
            .await?;

        self.audit
            .record(
                ctx,
                AuditAction::StatusChange,
                "property",
                property.id,
                serde_json::json!({
                    "from": previous.status.as_str(),
                    "to": status.as_str(),
                }),
            )
            .await;

        Ok(property)
    }
}
