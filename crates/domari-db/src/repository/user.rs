//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use domari_core::context::Role;
use domari_core::error::DomariResult;
use domari_core::models::user::{CreateUser, UpdateUser, User};
use domari_core::query::Page;
use domari_core::repository::{PaginatedResult, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    auth_ref: String,
    organization_id: Option<String>,
    full_name: String,
    email: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = parse_uuid("user", &self.record_id)?;
        let organization_id = parse_opt_uuid("organization", self.organization_id.as_deref())?;
        Ok(User {
            id,
            auth_ref: self.auth_ref,
            organization_id,
            full_name: self.full_name,
            email: self.email,
            role: parse_enum("role", &self.role, Role::parse)?,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("full_name") => "full_name",
        Some("email") => "email",
        _ => "created_at",
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> Result<User, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!("SELECT {SELECT_FIELDS} FROM type::record('user', $id)"))
            .bind(("id", id_str.clone()))
            .await?;

        let rows: Vec<UserRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;
        row.try_into_user()
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> DomariResult<User> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 auth_ref = $auth_ref, \
                 organization_id = $organization_id, \
                 full_name = $full_name, email = $email, \
                 role = $role, is_active = true",
            )
            .bind(("id", id.to_string()))
            .bind(("auth_ref", input.auth_ref))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("full_name", input.full_name))
            .bind(("email", input.email))
            .bind(("role", input.role.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(id).await?)
    }

    async fn get_by_id(&self, id: Uuid) -> DomariResult<User> {
        Ok(self.fetch(id).await?)
    }

    async fn get_by_auth_ref(&self, auth_ref: &str) -> DomariResult<User> {
        let auth_ref = auth_ref.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM user WHERE auth_ref = $auth_ref"
            ))
            .bind(("auth_ref", auth_ref.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("auth_ref={auth_ref}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_in_org(&self, org_id: Uuid, id: Uuid) -> DomariResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('user', $id) \
                 WHERE organization_id = $org"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn list(&self, org_id: Uuid, page: Page) -> DomariResult<PaginatedResult<User>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if page.search.is_some() {
            conditions.push(
                "(string::contains(string::lowercase(full_name), $search) \
                 OR string::contains(string::lowercase(email), $search))"
                    .to_string(),
            );
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
                "SELECT count() AS total FROM user WHERE {where_clause} GROUP ALL"
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
                "SELECT {SELECT_FIELDS} FROM user WHERE {where_clause} \
                 ORDER BY {order} LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(search) = page.search.clone() {
            query = query.bind(("search", search));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn update(&self, org_id: Uuid, id: Uuid, input: UpdateUser) -> DomariResult<User> {
        let mut sets = vec!["updated_at = time::now()".to_string()];
        if input.full_name.is_some() {
            sets.push("full_name = $full_name".into());
        }
        if input.role.is_some() {
            sets.push("role = $role".into());
        }
        if input.is_active.is_some() {
            sets.push("is_active = $is_active".into());
        }

        let mut query = self
            .db
            .query(format!(
                "UPDATE type::record('user', $id) SET {} \
                 WHERE organization_id = $org",
                sets.join(", ")
            ))
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()));
        if let Some(full_name) = input.full_name {
            query = query.bind(("full_name", full_name));
        }
        if let Some(role) = input.role {
            query = query.bind(("role", role.as_str().to_string()));
        }
        if let Some(is_active) = input.is_active {
            query = query.bind(("is_active", is_active));
        }
        query.await.map_err(DbError::from)?;

        self.get_in_org(org_id, id).await
    }

    async fn count_active(&self, org_id: Uuid) -> DomariResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM user \
                 WHERE organization_id = $org AND is_active = true \
                 GROUP ALL",
            )
            .bind(("org", org_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
