//! SurrealDB implementation of [`PropertyRepository`].
//!
//! Every query is unconditionally filtered on the caller's
//! organization id; the filter is injected here, never passed in as a
//! predicate.

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::property::{
    CreateProperty, Property, PropertyFilter, PropertyStatus, PropertyType, UpdateProperty,
};
use domari_core::query::Page;
use domari_core::repository::{PaginatedResult, PropertyRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_money, parse_opt_money, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PropertyRow {
    record_id: String,
    organization_id: String,
    name: String,
    address_line1: String,
    city: String,
    state: String,
    postal_code: String,
    property_type: String,
    status: String,
    bedrooms: u32,
    bathrooms: f64,
    square_feet: Option<u32>,
    year_built: Option<u32>,
    monthly_rent: String,
    purchase_price: Option<String>,
    amenities: Vec<String>,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyRow {
    fn try_into_property(self) -> Result<Property, DbError> {
        Ok(Property {
            id: parse_uuid("property", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            name: self.name,
            address_line1: self.address_line1,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            property_type: parse_enum("property_type", &self.property_type, PropertyType::parse)?,
            status: parse_enum("property status", &self.status, PropertyStatus::parse)?,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.square_feet,
            year_built: self.year_built,
            monthly_rent: parse_money("monthly_rent", &self.monthly_rent)?,
            purchase_price: parse_opt_money("purchase_price", self.purchase_price.as_deref())?,
            amenities: self.amenities,
            created_by: parse_uuid("created_by", &self.created_by)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

/// Case-insensitive partial-match fields for `search`.
const SEARCH_CLAUSE: &str = "(string::contains(string::lowercase(name), $search) \
     OR string::contains(string::lowercase(address_line1), $search) \
     OR string::contains(string::lowercase(city), $search))";

fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("name") => "name",
        Some("monthly_rent") => "monthly_rent",
        Some("status") => "status",
        _ => "created_at",
    }
}

/// SurrealDB implementation of the Property repository.
#[derive(Clone)]
pub struct SurrealPropertyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPropertyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, org_id: Uuid, id: Uuid) -> Result<Property, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('property', $id) \
                 WHERE organization_id = $org"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .await?;

        let rows: Vec<PropertyRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "property".into(),
            id: id_str,
        })?;
        row.try_into_property()
    }
}

impl<C: Connection> PropertyRepository for SurrealPropertyRepository<C> {
    async fn create(
        &self,
        org_id: Uuid,
        created_by: Uuid,
        input: CreateProperty,
    ) -> DomariResult<Property> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('property', $id) SET \
                 organization_id = $org, \
                 name = $name, address_line1 = $address_line1, \
                 city = $city, state = $state, \
                 postal_code = $postal_code, \
                 property_type = $property_type, \
                 status = $status, \
                 bedrooms = $bedrooms, bathrooms = $bathrooms, \
                 square_feet = $square_feet, year_built = $year_built, \
                 monthly_rent = $monthly_rent, \
                 purchase_price = $purchase_price, \
                 amenities = $amenities, \
                 created_by = $created_by",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("name", input.name))
            .bind(("address_line1", input.address_line1))
            .bind(("city", input.city))
            .bind(("state", input.state))
            .bind(("postal_code", input.postal_code))
            .bind(("property_type", input.property_type.as_str().to_string()))
            .bind(("status", PropertyStatus::Available.as_str().to_string()))
            .bind(("bedrooms", input.bedrooms))
            .bind(("bathrooms", input.bathrooms))
            .bind(("square_feet", input.square_feet))
            .bind(("year_built", input.year_built))
            .bind(("monthly_rent", input.monthly_rent.to_string()))
            .bind(("purchase_price", input.purchase_price.map(|p| p.to_string())))
            .bind(("amenities", input.amenities))
            .bind(("created_by", created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomariResult<Property> {
        Ok(self.fetch(org_id, id).await?)
    }

    async fn update(&self, org_id: Uuid, id: Uuid, input: UpdateProperty) -> DomariResult<Property> {
        let mut sets = vec!["updated_at = time::now()".to_string()];
        if input.name.is_some() {
            sets.push("name = $name".into());
        }
        if input.monthly_rent.is_some() {
            sets.push("monthly_rent = $monthly_rent".into());
        }
        if input.amenities.is_some() {
            sets.push("amenities = $amenities".into());
        }

        let mut query = self
            .db
            .query(format!(
                "UPDATE type::record('property', $id) SET {} \
                 WHERE organization_id = $org",
                sets.join(", ")
            ))
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()));
        if let Some(name) = input.name {
            query = query.bind(("name", name));
        }
        if let Some(rent) = input.monthly_rent {
            query = query.bind(("monthly_rent", rent.to_string()));
        }
        if let Some(amenities) = input.amenities {
            query = query.bind(("amenities", amenities));
        }
        query.await.map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn set_status(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: PropertyStatus,
    ) -> DomariResult<Property> {
        self.db
            .query(
                "UPDATE type::record('property', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE organization_id = $org",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("status", status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn list(
        &self,
        org_id: Uuid,
        filter: PropertyFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<Property>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if filter.status.is_some() {
            conditions.push("status = $status".into());
        }
        if filter.property_type.is_some() {
            conditions.push("property_type = $property_type".into());
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
                "SELECT count() AS total FROM property \
                 WHERE {where_clause} GROUP ALL"
            ))
            .bind(("org", org_id.to_string()));
        if let Some(status) = filter.status {
            count_query = count_query.bind(("status", status.as_str().to_string()));
        }
        if let Some(property_type) = filter.property_type {
            count_query = count_query.bind(("property_type", property_type.as_str().to_string()));
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
                "SELECT {SELECT_FIELDS} FROM property \
                 WHERE {where_clause} \
                 ORDER BY {order} LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(status) = filter.status {
            query = query.bind(("status", status.as_str().to_string()));
        }
        if let Some(property_type) = filter.property_type {
            query = query.bind(("property_type", property_type.as_str().to_string()));
        }
        if let Some(search) = page.search.clone() {
            query = query.bind(("search", search));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_property())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn count_active(&self, org_id: Uuid) -> DomariResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM property \
                 WHERE organization_id = $org AND status != 'OffMarket' \
                 GROUP ALL",
            )
            .bind(("org", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn list_in_range(
        &self,
        org_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomariResult<Vec<Property>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if from.is_some() {
            conditions.push("created_at >= $from".into());
        }
        if to.is_some() {
            conditions.push("created_at <= $to".into());
        }

        let mut query = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM property \
                 WHERE {} ORDER BY created_at ASC",
                conditions.join(" AND ")
            ))
            .bind(("org", org_id.to_string()));
        if let Some(from) = from {
            query = query.bind(("from", from));
        }
        if let Some(to) = to {
            query = query.bind(("to", to));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<PropertyRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_property())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
