//! SurrealDB implementation of [`InvoiceRepository`].
//!
//! Money columns are stored as canonical decimal strings and parsed at
//! the mapping boundary; no query ever compares them. Payments are
//! persisted with a conditional update keyed on the previously read
//! `paid_amount`, so concurrent payments cannot both apply.

use chrono::{DateTime, Utc};
use domari_core::error::DomariResult;
use domari_core::models::invoice::{
    Invoice, InvoiceFilter, InvoiceStatus, InvoiceType, LineItem, NewInvoice,
};
use domari_core::query::Page;
use domari_core::repository::{InvoiceRepository, PaginatedResult};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_enum, parse_money, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct InvoiceRow {
    record_id: String,
    organization_id: String,
    invoice_number: String,
    invoice_type: String,
    property_id: String,
    occupant_id: Option<String>,
    work_order_id: Option<String>,
    status: String,
    issue_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    line_items: Vec<serde_json::Value>,
    tax_rate: String,
    discount_amount: String,
    total_amount: String,
    paid_amount: String,
    balance: String,
    payment_link: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl InvoiceRow {
    fn try_into_invoice(self) -> Result<Invoice, DbError> {
        let line_items = self
            .line_items
            .into_iter()
            .map(serde_json::from_value::<LineItem>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::Mapping(format!("invalid line_items: {e}")))?;
        Ok(Invoice {
            id: parse_uuid("invoice", &self.record_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            invoice_number: self.invoice_number,
            invoice_type: parse_enum("invoice_type", &self.invoice_type, InvoiceType::parse)?,
            property_id: parse_uuid("property", &self.property_id)?,
            occupant_id: parse_opt_uuid("occupant", self.occupant_id.as_deref())?,
            work_order_id: parse_opt_uuid("work_order", self.work_order_id.as_deref())?,
            status: parse_enum("invoice status", &self.status, InvoiceStatus::parse)?,
            issue_date: self.issue_date,
            due_date: self.due_date,
            line_items,
            tax_rate: parse_money("tax_rate", &self.tax_rate)?,
            discount_amount: parse_money("discount_amount", &self.discount_amount)?,
            total_amount: parse_money("total_amount", &self.total_amount)?,
            paid_amount: parse_money("paid_amount", &self.paid_amount)?,
            balance: parse_money("balance", &self.balance)?,
            payment_link: self.payment_link,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_FIELDS: &str = "meta::id(id) AS record_id, *";

const SEARCH_CLAUSE: &str = "string::contains(string::lowercase(invoice_number), $search)";

fn sort_column(requested: Option<&str>) -> &'static str {
    match requested {
        Some("due_date") => "due_date",
        Some("issue_date") => "issue_date",
        Some("invoice_number") => "invoice_number",
        _ => "created_at",
    }
}

fn encode_line_items(items: &[LineItem]) -> Result<Vec<serde_json::Value>, DbError> {
    items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| DbError::Mapping(format!("line_items encode: {e}")))
}

/// SurrealDB implementation of the Invoice repository.
#[derive(Clone)]
pub struct SurrealInvoiceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInvoiceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, org_id: Uuid, id: Uuid) -> Result<Invoice, DbError> {
        let id_str = id.to_string();
        let mut result = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM type::record('invoice', $id) \
                 WHERE organization_id = $org"
            ))
            .bind(("id", id_str.clone()))
            .bind(("org", org_id.to_string()))
            .await?;

        let rows: Vec<InvoiceRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "invoice".into(),
            id: id_str,
        })?;
        row.try_into_invoice()
    }
}

impl<C: Connection> InvoiceRepository for SurrealInvoiceRepository<C> {
    async fn create(&self, org_id: Uuid, input: NewInvoice) -> DomariResult<Invoice> {
        let id = Uuid::new_v4();
        let line_items = encode_line_items(&input.line_items)?;

        let result = self
            .db
            .query(
                "CREATE type::record('invoice', $id) SET \
                 organization_id = $org, \
                 invoice_number = $invoice_number, \
                 invoice_type = $invoice_type, \
                 property_id = $property_id, \
                 occupant_id = $occupant_id, \
                 work_order_id = $work_order_id, \
                 status = $status, \
                 issue_date = $issue_date, due_date = $due_date, \
                 line_items = $line_items, \
                 tax_rate = $tax_rate, \
                 discount_amount = $discount_amount, \
                 total_amount = $total_amount, \
                 paid_amount = $paid_amount, \
                 balance = $balance, \
                 payment_link = NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("invoice_number", input.invoice_number))
            .bind(("invoice_type", input.invoice_type.as_str().to_string()))
            .bind(("property_id", input.property_id.to_string()))
            .bind(("occupant_id", input.occupant_id.map(|o| o.to_string())))
            .bind(("work_order_id", input.work_order_id.map(|w| w.to_string())))
            .bind(("status", input.status.as_str().to_string()))
            .bind(("issue_date", input.issue_date))
            .bind(("due_date", input.due_date))
            .bind(("line_items", line_items))
            .bind(("tax_rate", input.tax_rate.to_string()))
            .bind(("discount_amount", input.discount_amount.to_string()))
            .bind(("total_amount", input.total_amount.to_string()))
            .bind(("paid_amount", Decimal::ZERO.to_string()))
            .bind(("balance", input.balance.to_string()))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomariResult<Invoice> {
        Ok(self.fetch(org_id, id).await?)
    }

    async fn list(
        &self,
        org_id: Uuid,
        filter: InvoiceFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<Invoice>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if filter.status.is_some() {
            conditions.push("status = $status".into());
        }
        if filter.invoice_type.is_some() {
            conditions.push("invoice_type = $invoice_type".into());
        }
        if filter.property_id.is_some() {
            conditions.push("property_id = $property_id".into());
        }
        if filter.occupant_id.is_some() {
            conditions.push("occupant_id = $occupant_id".into());
        }
        if filter.issued_from.is_some() {
            conditions.push("issue_date >= $issued_from".into());
        }
        if filter.issued_to.is_some() {
            conditions.push("issue_date <= $issued_to".into());
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
                "SELECT count() AS total FROM invoice \
                 WHERE {where_clause} GROUP ALL"
            ))
            .bind(("org", org_id.to_string()));
        if let Some(status) = filter.status {
            count_query = count_query.bind(("status", status.as_str().to_string()));
        }
        if let Some(invoice_type) = filter.invoice_type {
            count_query = count_query.bind(("invoice_type", invoice_type.as_str().to_string()));
        }
        if let Some(property_id) = filter.property_id {
            count_query = count_query.bind(("property_id", property_id.to_string()));
        }
        if let Some(occupant_id) = filter.occupant_id {
            count_query = count_query.bind(("occupant_id", occupant_id.to_string()));
        }
        if let Some(issued_from) = filter.issued_from {
            count_query = count_query.bind(("issued_from", issued_from));
        }
        if let Some(issued_to) = filter.issued_to {
            count_query = count_query.bind(("issued_to", issued_to));
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
                "SELECT {SELECT_FIELDS} FROM invoice \
                 WHERE {where_clause} \
                 ORDER BY {order} LIMIT $limit START $offset"
            ))
            .bind(("org", org_id.to_string()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset));
        if let Some(status) = filter.status {
            query = query.bind(("status", status.as_str().to_string()));
        }
        if let Some(invoice_type) = filter.invoice_type {
            query = query.bind(("invoice_type", invoice_type.as_str().to_string()));
        }
        if let Some(property_id) = filter.property_id {
            query = query.bind(("property_id", property_id.to_string()));
        }
        if let Some(occupant_id) = filter.occupant_id {
            query = query.bind(("occupant_id", occupant_id.to_string()));
        }
        if let Some(issued_from) = filter.issued_from {
            query = query.bind(("issued_from", issued_from));
        }
        if let Some(issued_to) = filter.issued_to {
            query = query.bind(("issued_to", issued_to));
        }
        if let Some(search) = page.search.clone() {
            query = query.bind(("search", search));
        }
        let mut result = query.await.map_err(DbError::from)?;

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_invoice())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: page.offset,
            limit: page.limit,
        })
    }

    async fn apply_payment(
        &self,
        org_id: Uuid,
        id: Uuid,
        expected_paid: Decimal,
        new_paid: Decimal,
        new_balance: Decimal,
        new_status: InvoiceStatus,
    ) -> DomariResult<Option<Invoice>> {
        // Conditional on the previously read paid_amount: a concurrent
        // payment that landed first makes this a no-op.
        let mut result = self
            .db
            .query(
                "UPDATE type::record('invoice', $id) SET \
                 paid_amount = $new_paid, \
                 balance = $new_balance, \
                 status = $new_status, \
                 updated_at = time::now() \
                 WHERE organization_id = $org \
                 AND paid_amount = $expected_paid \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("expected_paid", expected_paid.to_string()))
            .bind(("new_paid", new_paid.to_string()))
            .bind(("new_balance", new_balance.to_string()))
            .bind(("new_status", new_status.as_str().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_invoice()?)),
            None => Ok(None),
        }
    }

    async fn set_payment_link(&self, org_id: Uuid, id: Uuid, url: String) -> DomariResult<Invoice> {
        self.db
            .query(
                "UPDATE type::record('invoice', $id) SET \
                 payment_link = $url, updated_at = time::now() \
                 WHERE organization_id = $org",
            )
            .bind(("id", id.to_string()))
            .bind(("org", org_id.to_string()))
            .bind(("url", url))
            .await
            .map_err(DbError::from)?;

        Ok(self.fetch(org_id, id).await?)
    }

    async fn set_status(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: InvoiceStatus,
    ) -> DomariResult<Invoice> {
        self.db
            .query(
                "UPDATE type::record('invoice', $id) SET \
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

    async fn list_in_range(
        &self,
        org_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomariResult<Vec<Invoice>> {
        let mut conditions = vec!["organization_id = $org".to_string()];
        if from.is_some() {
            conditions.push("issue_date >= $from".into());
        }
        if to.is_some() {
            conditions.push("issue_date <= $to".into());
        }

        let mut query = self
            .db
            .query(format!(
                "SELECT {SELECT_FIELDS} FROM invoice \
                 WHERE {} ORDER BY issue_date ASC",
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

        let rows: Vec<InvoiceRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_invoice())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
