//! Service provider directory — external trades that work orders can
//! be assigned to.

use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::audit::AuditAction;
use domari_core::models::service_provider::{CreateServiceProvider, ServiceProvider};
use domari_core::query::Page;
use domari_core::repository::{AuditLogRepository, PaginatedResult, ServiceProviderRepository};
use uuid::Uuid;

use crate::sink::AuditSink;

pub struct ProviderService<S, A>
where
    S: ServiceProviderRepository,
    A: AuditLogRepository,
{
    providers: S,
    audit: AuditSink<A>,
}

impl<S, A> ProviderService<S, A>
where
    S: ServiceProviderRepository,
    A: AuditLogRepository,
{
    pub fn new(providers: S, audit: AuditSink<A>) -> Self {
        Self { providers, audit }
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        input: CreateServiceProvider,
    ) -> DomariResult<ServiceProvider> {
        require_role(ctx, &[Role::OrgAdmin, Role::PropertyManager])?;
        if input.name.trim().is_empty() {
            return Err(DomariError::validation("provider name must not be empty"));
        }

        let provider = self.providers.create(ctx.organization_id, input).await?;

        self.audit
            .record(
                ctx,
                AuditAction::Create,
                "service_provider",
                provider.id,
                serde_json::json!({ "name": provider.name }),
            )
            .await;

        Ok(provider)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<ServiceProvider> {
        self.providers.get(ctx.organization_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        page: Page,
    ) -> DomariResult<PaginatedResult<ServiceProvider>> {
        self.providers.list(ctx.organization_id, page).await
    }
}
