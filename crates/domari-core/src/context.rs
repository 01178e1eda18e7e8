//! Resolved caller identity and the access policy checks.
//!
//! Every request is resolved into an [`AuthContext`] exactly once, at
//! the trust boundary; downstream code only ever sees the context,
//! never raw credentials or a client-supplied organization id.
//!
//! Role membership and tenant ownership are orthogonal checks and both
//! must pass: a sufficient role in one organization grants nothing in
//! another.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomariError, DomariResult};

/// Capability role of a user within their organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Platform operator; passes every role check.
    SuperAdmin,
    OrgAdmin,
    PropertyManager,
    Maintenance,
    Accountant,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SuperAdmin",
            Role::OrgAdmin => "OrgAdmin",
            Role::PropertyManager => "PropertyManager",
            Role::Maintenance => "Maintenance",
            Role::Accountant => "Accountant",
            Role::Viewer => "Viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SuperAdmin" => Some(Role::SuperAdmin),
            "OrgAdmin" => Some(Role::OrgAdmin),
            "PropertyManager" => Some(Role::PropertyManager),
            "Maintenance" => Some(Role::Maintenance),
            "Accountant" => Some(Role::Accountant),
            "Viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

/// Tenant-scoped identity of an authenticated caller.
///
/// The organization id is always taken from the stored user profile
/// during identity resolution, never from the client.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub organization_id: Uuid,
    pub role: Role,
    pub full_name: String,
    pub email: String,
}

/// Require the caller's role to be one of `allowed`.
///
/// `SuperAdmin` passes unconditionally. Denial is an
/// [`DomariError::AuthorizationDenied`], which the HTTP layer maps to
/// 403.
pub fn require_role(ctx: &AuthContext, allowed: &[Role]) -> DomariResult<()> {
    if ctx.role == Role::SuperAdmin || allowed.contains(&ctx.role) {
        return Ok(());
    }
    Err(DomariError::AuthorizationDenied {
        reason: format!("role {} is not permitted for this operation", ctx.role.as_str()),
    })
}

/// Require an entity to belong to the caller's organization.
///
/// A mismatch is reported as `NotFound`, not as a denial: callers must
/// not be able to distinguish another tenant's entity from an absent
/// one.
pub fn ensure_same_org(ctx: &AuthContext, entity: &str, id: Uuid, entity_org: Uuid) -> DomariResult<()> {
    if entity_org == ctx.organization_id {
        Ok(())
    } else {
        Err(DomariError::not_found(entity, id))
    }
}
