//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::organization::{
    CreateOrganization, Organization, Plan, PlanStatus, derive_subdomain,
};
use domari_core::repository::OrganizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_enum;
use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    record_id: String,
    name: String,
    subdomain: String,
    plan: String,
    plan_status: String,
    billing_customer_ref: Option<String>,
    billing_subscription_ref: Option<String>,
    trial_ends_at: Option<DateTime<Utc>>,
    current_period_ends_at: Option<DateTime<Utc>>,
    cancel_at_period_end: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = super::parse_uuid("organization", &self.record_id)?;
        Ok(Organization {
            id,
            name: self.name,
            subdomain: self.subdomain,
            plan: parse_enum("plan", &self.plan, Plan::parse)?,
            plan_status: parse_enum("plan_status", &self.plan_status, PlanStatus::parse)?,
            billing_customer_ref: self.billing_customer_ref,
            billing_subscription_ref: self.billing_subscription_ref,
            trial_ends_at: self.trial_ends_at,
            current_period_ends_at: self.current_period_ends_at,
            cancel_at_period_end: self.cancel_at_period_end,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> Result<Organization, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('organization', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await?;

        let rows: Vec<OrganizationRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;
        row.try_into_organization()
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> DomariResult<Organization> {
        let id = Uuid::new_v4();
        let subdomain = derive_subdomain(&input.name);

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, subdomain = $subdomain, \
                 plan = $plan, plan_status = $plan_status, \
                 billing_customer_ref = NONE, \
                 billing_subscription_ref = NONE, \
                 trial_ends_at = NONE, current_period_ends_at = NONE, \
                 cancel_at_period_end = false",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("subdomain", subdomain))
            .bind(("plan", input.plan.as_str().to_string()))
            .bind(("plan_status", PlanStatus::Trialing.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(id).await?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomariResult<Organization> {
        Ok(self.fetch(id).await?)
    }

    async fn get_by_subdomain(&self, subdomain: &str) -> DomariResult<Organization> {
        let subdomain = subdomain.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM organization \
                 WHERE subdomain = $subdomain"
            ))
            .bind(("subdomain", subdomain.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: format!("subdomain={subdomain}"),
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn set_plan(&self, id: Uuid, plan: Plan, status: PlanStatus) -> DomariResult<Organization> {
        self.db
            .query(
                "UPDATE type::record('organization', $id) SET \
                 plan = $plan, plan_status = $plan_status, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("plan", plan.as_str().to_string()))
            .bind(("plan_status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(self.fetch(id).await?)
    }

    async fn set_billing_refs(
        &self,
        id: Uuid,
        customer_ref: Option<String>,
        subscription_ref: Option<String>,
    ) -> DomariResult<Organization> {
        self.db
            .query(
                "UPDATE type::record('organization', $id) SET \
                 billing_customer_ref = $customer_ref, \
                 billing_subscription_ref = $subscription_ref, \
                 updated_at = time::now()",
            )
            .bind(("id", id.to_string()))
            .bind(("customer_ref", customer_ref))
            .bind(("subscription_ref", subscription_ref))
            .await
            .map_err(DbError::from)?;

        Ok(self.fetch(id).await?)
    }
}
