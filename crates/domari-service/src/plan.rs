//! Plan gate — quota enforcement ahead of resource creation, and the
//! billing status projection.

use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::organization::{Plan, PlanStatus};
use domari_core::repository::{OrganizationRepository, PropertyRepository, UserRepository};
use serde::Serialize;
use uuid::Uuid;

/// Quota-gated resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Properties,
    Users,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Properties => "properties",
            Resource::Users => "users",
        }
    }
}

/// Usage of one quota-gated resource. `limit: None` means unlimited.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResourceUsage {
    pub used: u64,
    pub limit: Option<u64>,
}

/// Subscription state of the caller's organization.
#[derive(Debug, Clone, Serialize)]
pub struct BillingStatus {
    pub plan: Plan,
    pub plan_status: PlanStatus,
    pub cancel_at_period_end: bool,
    pub properties: ResourceUsage,
    pub users: ResourceUsage,
}

/// Compares current usage against the organization's plan ceilings.
pub struct PlanGate<O, P, U>
where
    O: OrganizationRepository,
    P: PropertyRepository,
    U: UserRepository,
{
    orgs: O,
    properties: P,
    users: U,
}

impl<O, P, U> PlanGate<O, P, U>
where
    O: OrganizationRepository,
    P: PropertyRepository,
    U: UserRepository,
{
    pub fn new(orgs: O, properties: P, users: U) -> Self {
        Self {
            orgs,
            properties,
            users,
        }
    }

    async fn usage(&self, org_id: Uuid, resource: Resource) -> DomariResult<ResourceUsage> {
        let org = self.orgs.get_by_id(org_id).await?;
        let limits = org.plan.limits();
        Ok(match resource {
            Resource::Properties => ResourceUsage {
                used: self.properties.count_active(org_id).await?,
                limit: limits.max_properties,
            },
            Resource::Users => ResourceUsage {
                used: self.users.count_active(org_id).await?,
                limit: limits.max_users,
            },
        })
    }

    /// Reject with `QuotaExceeded` when creating one more `resource`
    /// would pass the plan ceiling. Must run before any row is
    /// written.
    pub async fn check_quota(&self, org_id: Uuid, resource: Resource) -> DomariResult<()> {
        let usage = self.usage(org_id, resource).await?;
        match usage.limit {
            Some(limit) if usage.used >= limit => Err(DomariError::QuotaExceeded {
                resource: resource.as_str().to_string(),
                limit,
            }),
            _ => Ok(()),
        }
    }

    /// Plan, billing status, and per-resource usage for the caller's
    /// organization.
    pub async fn billing_status(&self, ctx: &AuthContext) -> DomariResult<BillingStatus> {
        require_role(ctx, &[Role::OrgAdmin, Role::Accountant])?;
        let org = self.orgs.get_by_id(ctx.organization_id).await?;
        Ok(BillingStatus {
            plan: org.plan,
            plan_status: org.plan_status,
            cancel_at_period_end: org.cancel_at_period_end,
            properties: self.usage(ctx.organization_id, Resource::Properties).await?,
            users: self.usage(ctx.organization_id, Resource::Users).await?,
        })
    }
}
