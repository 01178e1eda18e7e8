//! SurrealDB implementation of [`ServiceProviderRepository`].

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::service_provider::{
    AvailabilityStatus, CreateServiceProvider, ServiceProvider,
};
use domari_core::models::work_order::WorkOrderCategory;
use domari_core::query::Page;
use domari_core::repository::{PaginatedResult, ServiceProviderRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_opt_money, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ServiceProviderRow {
    record_id: String,
    organization_id: String,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    specialties: Vec<String>,
    availability_status: String,
    hourly_rate: Option<String>,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceProviderRow {
    fn try_into_provider(self) -> Result<ServiceProvider, DbError> {
        let specialties = self
            .specialties
            .iter()
            .map(|s| parse_enum("specialty", s, WorkOrderCategory::parse))
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(ServiceProvider {
            id: parse_uuid("service_provider", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            name: self.name,
            email: self.email,
            phone: self.phone,
            specialties,
            availability_status: parse_enum(
                "availability_status",
                &self.availability_status,
                AvailabilityStatus::parse,
            )?,
            hourly_rate: parse_opt_money("hourly_rate", self.hourly_rate.as_deref())?,
            is_verified: self.is_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

/// SurrealDB implementation of the ServiceProvider repository.
#[derive(Clone)]
pub struct SurrealServiceProviderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealServiceProviderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, org_id: Uuid, id: Uuid) -> Result<ServiceProvider, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('service_provider', $id) \
                 WHERE organization_id = $org"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .await?;

        let rows: Vec<ServiceProviderRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "service_provider".into(),
            id: id_str,
        })?;
        row.try_into_provider()
    }
}

impl<C: Connection> ServiceProviderRepository for SurrealServiceProviderRepository<C> {
    async fn create(&self, org_id: Uuid, input: CreateServiceProvider) -> DomariResult<ServiceProvider> {
        let id = Uuid::new_v4();

        let specialties: Vec<String> = input
            .specialties
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();

        let result = self
            .db
            .query(
                "CREATE type::record('service_provider', $id) SET \
                 organization_id = $org, \
                 name = $name, email = $email, phone = $phone, \
                 specialties = $specialties, \
                 availability_status = $availability_status, \
                 hourly_rate = $hourly_rate, \
                 is_verified = false",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("name", input.name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("specialties", specialties))
            .bind((
                "availability_status",
                AvailabilityStatus::Available.as_str().to_string(),
            ))
            .bind(("hourly_rate", input.hourly_rate.map(|r| r.to_string())))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomariResult<ServiceProvider> {
        Ok(self.fetch(org_id, id).await?)
    }

    async fn list(&self, org_id: Uuid, page: Page) -> DomariResult<PaginatedResult<ServiceProvider>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if page.search.is_some() {
            conditions.push("string::contains(string::lowercase(name), $search)".into());
        }
        let where_clause = conditions.join(" AND ");

        let mut count_query = self
            .db
            .query(format!(
                "SELECT count() AS total FROM service_provider \
                 WHERE {where_clause} GROUP ALL"
            ))
            .bind(("org", org_id.to_string()));
        if let Some(search) = page.search.clone() {
            count_query = count_query.bind(("search", search));
        }
        let mut count_result = count_query.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut query = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM service_provider \
                 WHERE {where_clause} \
                 ORDER BY name {} LIMIT $limit START $offset",
                page.sort_order.as_sql()
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(search) = page.search.clone() {
            query = query.bind(("search", search));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<ServiceProviderRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_provider())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }
}
