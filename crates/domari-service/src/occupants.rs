//! Occupant management — residents attached to a property.

use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::audit::AuditAction;
use domari_core::models::occupant::{CreateOccupant, Occupant, OccupantFilter};
use domari_core::query::Page;
use domari_core::repository::{
    AuditLogRepository, OccupantRepository, PaginatedResult, PropertyRepository,
};
use uuid::Uuid;

use crate::sink::AuditSink;

const MANAGE_ROLES: &[Role] = &[Role::OrgAdmin, Role::PropertyManager];

pub struct OccupantService<Oc, P, A>
where
    Oc: OccupantRepository,
    P: PropertyRepository,
    A: AuditLogRepository,
{
    occupants: Oc,
    properties: P,
    audit: AuditSink<A>,
}

impl<Oc, P, A> OccupantService<Oc, P, A>
where
    Oc: OccupantRepository,
    P: PropertyRepository,
    A: AuditLogRepository,
{
    pub fn new(occupants: Oc, properties: P, audit: AuditSink<A>) -> Self {
        Self {
            occupants,
            properties,
            audit,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: CreateOccupant) -> DomariResult<Occupant> {
        require_role(ctx, MANAGE_ROLES)?;
        if input.lease_end <= input.lease_start {
            return Err(DomariError::validation("lease_end must be after lease_start"));
        }
        // The property lookup is tenant-scoped, so a foreign property
        // id fails as NotFound here.
        self.properties.get(ctx.organization_id, input.property_id).await?;

        let occupant = self.occupants.create(ctx.organization_id, input).await?;

        self.audit
            .record(
                ctx,
                AuditAction::Create,
                "occupant",
                occupant.id,
                serde_json::json!({ "full_name": occupant.full_name }),
            )
            .await;

        Ok(occupant)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<Occupant> {
        self.occupants.get(ctx.organization_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: OccupantFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<Occupant>> {
        self.occupants.list(ctx.organization_id, filter, page).await
    }
}
