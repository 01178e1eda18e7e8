//! SurrealDB implementation of [`OccupantRepository`].

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::occupant::{
    CreateOccupant, EmergencyContact, Occupant, OccupantFilter, OccupantStatus,
};
use domari_core::query::Page;
use domari_core::repository::{OccupantRepository, PaginatedResult};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_money, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OccupantRow {
    record_id: String,
    organization_id: String,
    property_id: String,
    full_name: String,
    email: String,
    phone: Option<String>,
    lease_start: DateTime<Utc>,
    lease_end: DateTime<Utc>,
    monthly_rent: String,
    security_deposit: String,
    status: String,
    emergency_contact: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OccupantRow {
    fn try_into_occupant(self) -> Result<Occupant, DbError> {
        let emergency_contact = self
            .emergency_contact
            .map(serde_json::from_value::<EmergencyContact>)
            .transpose()
            .map_err(|e| DbError::Mapping(format!("invalid emergency_contact: {e}")))?;
        Ok(Occupant {
            id: parse_uuid("occupant", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            property_id: parse_uuid("property", &self.property_id)?,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            lease_start: self.lease_start,
            lease_end: self.lease_end,
            monthly_rent: parse_money("monthly_rent", &self.monthly_rent)?,
            security_deposit: parse_money("security_deposit", &self.security_deposit)?,
            status: parse_enum("occupant status", &self.status, OccupantStatus::parse)?,
            emergency_contact,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

const SEARCH_CLAUSE: &str = "(string::contains(string::lowercase(full_name), $search) \
     OR string::contains(string::lowercase(email), $search))";

fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("full_name") => "full_name",
        Some("lease_end") => "lease_end",
        _ => "created_at",
    }
}

/// SurrealDB implementation of the Occupant repository.
#[derive(Clone)]
pub struct SurrealOccupantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOccupantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, org_id: Uuid, id: Uuid) -> Result<Occupant, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('occupant', $id) \
                 WHERE organization_id = $org"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .await?;

        let rows: Vec<OccupantRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "occupant".into(),
            id: id_str,
        })?;
        row.try_into_occupant()
    }
}

impl<C: Connection> OccupantRepository for SurrealOccupantRepository<C> {
    async fn create(&self, org_id: Uuid, input: CreateOccupant) -> DomariResult<Occupant> {
        let id = Uuid::new_v4();

        let emergency_contact = input
            .emergency_contact
            .map(|c| serde_json::to_value(&c))
            .transpose()
            .map_err(|e| DbError::Mapping(format!("emergency_contact encode: {e}")))?;

        let result = self
            .db
            .query(
                "CREATE type::record('occupant', $id) SET \
                 organization_id = $org, \
                 property_id = $property_id, \
                 full_name = $full_name, email = $email, phone = $phone, \
                 lease_start = $lease_start, lease_end = $lease_end, \
                 monthly_rent = $monthly_rent, \
                 security_deposit = $security_deposit, \
                 status = $status, \
                 emergency_contact = $emergency_contact",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("full_name", input.full_name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("lease_start", input.lease_start))
            .bind(("lease_end", input.lease_end))
            .bind(("monthly_rent", input.monthly_rent.to_string()))
            .bind(("security_deposit", input.security_deposit.to_string()))
            .bind(("status", OccupantStatus::Pending.as_str().to_string()))
            .bind(("emergency_contact", emergency_contact))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomariResult<Occupant> {
        Ok(self.fetch(org_id, id).await?)
    }

    async fn list(
        &self,
        org_id: Uuid,
        filter: OccupantFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<Occupant>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if filter.status.is_some() {
            conditions.push("status = $status".into());
        }
        if filter.property_id.is_some() {
            conditions.push("property_id = $property_id".into());
        }
        if page.search.is_some() {
            conditions.push(SEARCH_CLAUSE.into());
        }
        let where_clause = conditions.join(" AND ");
        let order = format!(
            "{} {}",
            sort_column(page.sort_by.as_deref()),
            page.sort_order.as_sql()
        );

        let mut count_query = self
            .db
            .query(format!(
                "SELECT count() AS total FROM occupant \
                 WHERE {where_clause} GROUP ALL"
            ))
            .bind(("org", org_id.to_string()));
        if let Some(status) = filter.status {
            count_query = count_query.bind(("status", status.as_str().to_string()));
        }
        if let Some(property_id) = filter.property_id {
            count_query = count_query.bind(("property_id", property_id.to_string()));
        }
        if let Some(search) = page.search.clone() {
            count_query = count_query.bind(("search", search));
        }
        let mut count_result = count_query.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut query = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM occupant \
                 WHERE {where_clause} \
                 ORDER BY {order} LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(status) = filter.status {
            query = query.bind(("status", status.as_str().to_string()));
        }
        if let Some(property_id) = filter.property_id {
            query = query.bind(("property_id", property_id.to_string()));
        }
        if let Some(search) = page.search.clone() {
            query = query.bind(("search", search));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<OccupantRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_occupant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }
}
