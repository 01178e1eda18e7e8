//! SurrealDB implementation of [`WorkOrderRepository`].
//!
//! Status transitions are persisted with a conditional update keyed on
//! the previously read status, so two operators racing on the same work
//! order cannot both win.

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::work_order::{
    Assignee, CreateWorkOrder, Priority, WorkOrder, WorkOrderCategory, WorkOrderFilter,
    WorkOrderStatus, WorkOrderUpdate,
};
use domari_core::query::Page;
use domari_core::repository::{PaginatedResult, WorkOrderRepository};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_opt_money, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct WorkOrderRow {
    record_id: String,
    organization_id: String,
    property_id: String,
    occupant_id: Option<String>,
    title: String,
    description: String,
    category: String,
    priority: String,
    status: String,
    estimated_cost: Option<String>,
    actual_cost: Option<String>,
    assigned_to_kind: Option<String>,
    assigned_to_id: Option<String>,
    due_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkOrderRow {
    fn try_into_work_order(self) -> Result<WorkOrder, DbError> {
        let assigned_to = match (self.assigned_to_kind.as_deref(), self.assigned_to_id.as_deref()) {
            (Some("User"), Some(id)) => Some(Assignee::User(parse_uuid("assignee", id)?)),
            (Some("Provider"), Some(id)) => Some(Assignee::Provider(parse_uuid("assignee", id)?)),
            (None, None) => None,
            (kind, _) => {
                return Err(DbError::Mapping(format!(
                    "inconsistent assignee columns (kind {kind:?})"
                )));
            }
        };
        Ok(WorkOrder {
            id: parse_uuid("work_order", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            property_id: parse_uuid("property", &self.property_id)?,
            occupant_id: parse_opt_uuid("occupant", self.occupant_id.as_deref())?,
            title: self.title,
            description: self.description,
            category: parse_enum("category", &self.category, WorkOrderCategory::parse)?,
            priority: parse_enum("priority", &self.priority, Priority::parse)?,
            status: parse_enum("work order status", &self.status, WorkOrderStatus::parse)?,
            estimated_cost: parse_opt_money("estimated_cost", self.estimated_cost.as_deref())?,
            actual_cost: parse_opt_money("actual_cost", self.actual_cost.as_deref())?,
            assigned_to,
            due_at: self.due_at,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct WorkOrderUpdateRow {
    record_id: String,
    organization_id: String,
    work_order_id: String,
    author_id: String,
    from_status: String,
    to_status: String,
    message: String,
    image_refs: Vec<String>,
    created_at: DateTime<Utc>,
}

impl WorkOrderUpdateRow {
    fn try_into_update(self) -> Result<WorkOrderUpdate, DbError> {
        Ok(WorkOrderUpdate {
            id: parse_uuid("work_order_update", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            work_order_id: parse_uuid("work_order", &self.work_order_id)?,
            author_id: parse_uuid("author", &self.author_id)?,
            from_status: parse_enum("from_status", &self.from_status, WorkOrderStatus::parse)?,
            to_status: parse_enum("to_status", &self.to_status, WorkOrderStatus::parse)?,
            message: self.message,
            image_refs: self.image_refs,
            created_at: self.created_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

const SEARCH_CLAUSE: &str = "(string::contains(string::lowercase(title), $search) \
     OR string::contains(string::lowercase(description), $search))";

/// Default ordering is by urgency: Critical first, newest first within
/// the same priority.
fn order_clause(page: &Page) -> String {
    match page.sort_by.as_deref() {
        Some("created_at") => format!("created_at {}", page.sort_order.as_sql()),
        Some("due_at") => format!("due_at {}", page.sort_order.as_sql()),
        Some("priority") => format!("priority_rank {}", page.sort_order.as_sql()),
        _ => "priority_rank ASC, created_at DESC".to_string(),
    }
}

fn assignee_columns(assignee: Option<Assignee>) -> (Option<String>, Option<String>) {
    match assignee {
        Some(Assignee::User(id)) => (Some("User".into()), Some(id.to_string())),
        Some(Assignee::Provider(id)) => (Some("Provider".into()), Some(id.to_string())),
        None => (None, None),
    }
}

/// SurrealDB implementation of the WorkOrder repository.
#[derive(Clone)]
pub struct SurrealWorkOrderRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealWorkOrderRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, org_id: Uuid, id: Uuid) -> Result<WorkOrder, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('work_order', $id) \
                 WHERE organization_id = $org"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .await?;

        let rows: Vec<WorkOrderRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "work_order".into(),
            id: id_str,
        })?;
        row.try_into_work_order()
    }
}

impl<C: Connection> WorkOrderRepository for SurrealWorkOrderRepository<C> {
    async fn create(&self, org_id: Uuid, input: CreateWorkOrder) -> DomariResult<WorkOrder> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('work_order', $id) SET \
                 organization_id = $org, \
                 property_id = $property_id, \
                 occupant_id = $occupant_id, \
                 title = $title, description = $description, \
                 category = $category, \
                 priority = $priority, priority_rank = $priority_rank, \
                 status = $status, \
                 estimated_cost = $estimated_cost, \
                 actual_cost = NONE, \
                 assigned_to_kind = NONE, assigned_to_id = NONE, \
                 due_at = $due_at, completed_at = NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("occupant_id", input.occupant_id.map(|o| o.to_string())))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("category", input.category.as_str().to_string()))
            .bind(("priority", input.priority.as_str().to_string()))
            .bind(("priority_rank", input.priority.rank() as u32))
            .bind(("status", WorkOrderStatus::Open.as_str().to_string()))
            .bind(("estimated_cost", input.estimated_cost.map(|c| c.to_string())))
            .bind(("due_at", input.due_at))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomariResult<WorkOrder> {
        Ok(self.fetch(org_id, id).await?)
    }

    async fn list(
        &self,
        org_id: Uuid,
        filter: WorkOrderFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<WorkOrder>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if filter.status.is_some() {
            conditions.push("status = $status".into());
        }
        if filter.priority.is_some() {
            conditions.push("priority = $priority".into());
        }
        if filter.property_id.is_some() {
            conditions.push("property_id = $property_id".into());
        }
        if page.search.is_some() {
            conditions.push(SEARCH_CLAUSE.into());
        }
        let where_clause = conditions.join(" AND ");
        let order = order_clause(&page);

        let mut count_query = self
            .db
            .query(format!(
                "SELECT count() AS total FROM work_order \
                 WHERE {where_clause} GROUP ALL"
            ))
            .bind(("org", org_id.to_string()));
        if let Some(status) = filter.status {
            count_query = count_query.bind(("status", status.as_str().to_string()));
        }
        if let Some(priority) = filter.priority {
            count_query = count_query.bind(("priority", priority.as_str().to_string()));
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
                "SELECT {SELECT_FIELDS} FROM work_order \
                 WHERE {where_clause} \
                 ORDER BY {order} LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(status) = filter.status {
            query = query.bind(("status", status.as_str().to_string()));
        }
        if let Some(priority) = filter.priority {
            query = query.bind(("priority", priority.as_str().to_string()));
        }
        if let Some(property_id) = filter.property_id {
            query = query.bind(("property_id", property_id.to_string()));
        }
        if let Some(search) = page.search.clone() {
            query = query.bind(("search", search));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<WorkOrderRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_work_order())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn apply_transition(
        &self,
        org_id: Uuid,
        id: Uuid,
        from: WorkOrderStatus,
        to: WorkOrderStatus,
        assigned_to: Option<Assignee>,
        actual_cost: Option<Decimal>,
        completed_at: Option<DateTime<Utc>>,
    ) -> DomariResult<Option<WorkOrder>> {
        let (assignee_kind, assignee_id) = assignee_columns(assigned_to);

        let mut sets = vec![
            "status = $to".to_string(),
            "updated_at = time::now()".to_string(),
        ];
        if assignee_kind.is_some() {
            sets.push("assigned_to_kind = $assignee_kind".into());
            sets.push("assigned_to_id = $assignee_id".into());
        }
        if actual_cost.is_some() {
            sets.push("actual_cost = $actual_cost".into());
        }
        if completed_at.is_some() {
            sets.push("completed_at = $completed_at".into());
        }

        // Conditional on the previously read status: a concurrent
        // transition that got there first makes this a no-op.
        let mut query = self
            .db
            .query(format!(
                "UPDATE type::record('work_order', $id) SET {} \
                 WHERE organization_id = $org AND status = $from \
                 RETURN meta::id(id) AS record_id, *",
                sets.join(", ")
            ))
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("from", from.as_str().to_string()))
            .bind(("to", to.as_str().to_string()));
        if let Some(kind) = assignee_kind {
            query = query
                .bind(("assignee_kind", kind))
                .bind(("assignee_id", assignee_id));
        }
        if let Some(cost) = actual_cost {
            query = query.bind(("actual_cost", cost.to_string()));
        }
        if let Some(completed_at) = completed_at {
            query = query.bind(("completed_at", completed_at));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<WorkOrderRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_work_order()?)),
            None => Ok(None),
        }
    }

    async fn add_update(&self, entry: WorkOrderUpdate) -> DomariResult<WorkOrderUpdate> {
        let id_str = entry.id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('work_order_update', $id) SET \
                 organization_id = $org, \
                 work_order_id = $work_order_id, \
                 author_id = $author_id, \
                 from_status = $from_status, to_status = $to_status, \
                 message = $message, image_refs = $image_refs",
            )
            .bind(("id", id_str.clone()))
            .bind(("org", entry.organization_id.to_string()))
            .bind(("work_order_id", entry.work_order_id.to_string()))
            .bind(("author_id", entry.author_id.to_string()))
            .bind(("from_status", entry.from_status.as_str().to_string()))
            .bind(("to_status", entry.to_status.as_str().to_string()))
            .bind(("message", entry.message.clone()))
            .bind(("image_refs", entry.image_refs.clone()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('work_order_update', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkOrderUpdateRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "work_order_update".into(),
            id: id_str,
        })?;

        Ok(row.try_into_update()?)
    }

    async fn list_updates(&self, org_id: Uuid, work_order_id: Uuid) -> DomariResult<Vec<WorkOrderUpdate>> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM work_order_update \
                 WHERE organization_id = $org \
                 AND work_order_id = $work_order_id \
                 ORDER BY created_at ASC"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("work_order_id", work_order_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<WorkOrderUpdateRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_update())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn list_in_range(
        &self,
        org_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomariResult<Vec<WorkOrder>> {
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
                "SELECT {SELECT_FIELDS} FROM work_order \
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

        let rows: Vec<WorkOrderRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_work_order())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
