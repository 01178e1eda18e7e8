//! Tabular CSV export — read-only flattened projections.
//!
//! Formatting rules: every cell is double-quoted with embedded quotes
//! doubled, dates render as `MM/dd/yyyy`, money renders with exactly
//! two decimals. Related names (property, occupant, assignee) are
//! denormalized into the rows.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::DomariResult;
use domari_core::models::work_order::Assignee;
use domari_core::repository::{
    InvoiceRepository, OccupantRepository, PropertyRepository, ServiceProviderRepository,
    UserRepository, WorkOrderRepository,
};
use rust_decimal::Decimal;
use uuid::Uuid;

const EXPORT_ROLES: &[Role] = &[Role::OrgAdmin, Role::PropertyManager, Role::Accountant];

/// A rendered export file.
#[derive(Debug, Clone)]
pub struct CsvFile {
    pub filename: String,
    pub content: String,
}

/// Quote one cell: always wrapped in double quotes, embedded quotes
/// doubled.
fn cell(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn row(cells: &[String]) -> String {
    cells.iter().map(|c| cell(c)).collect::<Vec<_>>().join(",")
}

fn fmt_date(date: DateTime<Utc>) -> String {
    date.format("%m/%d/%Y").to_string()
}

fn fmt_opt_date(date: Option<DateTime<Utc>>) -> String {
    date.map(fmt_date).unwrap_or_default()
}

fn fmt_money(amount: Decimal) -> String {
    format!("{amount:.2}")
}

fn fmt_opt_money(amount: Option<Decimal>) -> String {
    amount.map(fmt_money).unwrap_or_default()
}

fn filename(entity: &str, now: DateTime<Utc>) -> String {
    format!("domari-{entity}-{}.csv", now.format("%Y-%m-%d"))
}

pub struct ExportService<I, P, Oc, W, U, S>
where
    I: InvoiceRepository,
    P: PropertyRepository,
    Oc: OccupantRepository,
    W: WorkOrderRepository,
    U: UserRepository,
    S: ServiceProviderRepository,
{
    invoices: I,
    properties: P,
    occupants: Oc,
    work_orders: W,
    users: U,
    providers: S,
}

impl<I, P, Oc, W, U, S> ExportService<I, P, Oc, W, U, S>
where
    I: InvoiceRepository,
    P: PropertyRepository,
    Oc: OccupantRepository,
    W: WorkOrderRepository,
    U: UserRepository,
    S: ServiceProviderRepository,
{
    pub fn new(invoices: I, properties: P, occupants: Oc, work_orders: W, users: U, providers: S) -> Self {
        Self {
            invoices,
            properties,
            occupants,
            work_orders,
            users,
            providers,
        }
    }

    async fn property_name(
        &self,
        org_id: Uuid,
        cache: &mut HashMap<Uuid, String>,
        id: Uuid,
    ) -> String {
        if let Some(name) = cache.get(&id) {
            return name.clone();
        }
        let name = match self.properties.get(org_id, id).await {
            Ok(p) => p.name,
            Err(_) => String::new(),
        };
        cache.insert(id, name.clone());
        name
    }

    async fn occupant_name(
        &self,
        org_id: Uuid,
        cache: &mut HashMap<Uuid, String>,
        id: Uuid,
    ) -> String {
        if let Some(name) = cache.get(&id) {
            return name.clone();
        }
        let name = match self.occupants.get(org_id, id).await {
            Ok(o) => o.full_name,
            Err(_) => String::new(),
        };
        cache.insert(id, name.clone());
        name
    }

    async fn assignee_name(&self, org_id: Uuid, assignee: Assignee) -> String {
        match assignee {
            Assignee::User(id) => self
                .users
                .get_in_org(org_id, id)
                .await
                .map(|u| u.full_name)
                .unwrap_or_default(),
            Assignee::Provider(id) => self
                .providers
                .get(org_id, id)
                .await
                .map(|p| p.name)
                .unwrap_or_default(),
        }
    }

    pub async fn export_invoices(
        &self,
        ctx: &AuthContext,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomariResult<CsvFile> {
        require_role(ctx, EXPORT_ROLES)?;
        let invoices = self.invoices.list_in_range(ctx.organization_id, from, to).await?;

        let mut properties = HashMap::new();
        let mut occupants = HashMap::new();
        let mut lines = vec![row(&[
            "Invoice #".into(),
            "Type".into(),
            "Status".into(),
            "Property".into(),
            "Tenant".into(),
            "Issue Date".into(),
            "Due Date".into(),
            "Total".into(),
            "Paid".into(),
            "Balance".into(),
        ])];

        for inv in invoices {
            let property = self
                .property_name(ctx.organization_id, &mut properties, inv.property_id)
                .await;
            let tenant = match inv.occupant_id {
                Some(id) => self.occupant_name(ctx.organization_id, &mut occupants, id).await,
                None => String::new(),
            };
            lines.push(row(&[
                inv.invoice_number,
                inv.invoice_type.as_str().into(),
                inv.status.as_str().into(),
                property,
                tenant,
                fmt_date(inv.issue_date),
                fmt_date(inv.due_date),
                fmt_money(inv.total_amount),
                fmt_money(inv.paid_amount),
                fmt_money(inv.balance),
            ]));
        }

        Ok(CsvFile {
            filename: filename("invoices", Utc::now()),
            content: lines.join("\n") + "\n",
        })
    }

    pub async fn export_properties(
        &self,
        ctx: &AuthContext,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomariResult<CsvFile> {
        require_role(ctx, EXPORT_ROLES)?;
        let properties = self.properties.list_in_range(ctx.organization_id, from, to).await?;

        let mut lines = vec![row(&[
            "Name".into(),
            "Type".into(),
            "Status".into(),
            "Address".into(),
            "City".into(),
            "State".into(),
            "Bedrooms".into(),
            "Bathrooms".into(),
            "Monthly Rent".into(),
            "Created".into(),
        ])];

        for p in properties {
            lines.push(row(&[
                p.name,
                p.property_type.as_str().into(),
                p.status.as_str().into(),
                p.address_line1,
                p.city,
                p.state,
                p.bedrooms.to_string(),
                p.bathrooms.to_string(),
                fmt_money(p.monthly_rent),
                fmt_date(p.created_at),
            ]));
        }

        Ok(CsvFile {
            filename: filename("properties", Utc::now()),
            content: lines.join("\n") + "\n",
        })
    }

    pub async fn export_work_orders(
        &self,
        ctx: &AuthContext,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> DomariResult<CsvFile> {
        require_role(ctx, EXPORT_ROLES)?;
        let orders = self.work_orders.list_in_range(ctx.organization_id, from, to).await?;

        let mut properties = HashMap::new();
        let mut lines = vec![row(&[
            "Title".into(),
            "Category".into(),
            "Priority".into(),
            "Status".into(),
            "Property".into(),
            "Assigned To".into(),
            "Estimated Cost".into(),
            "Actual Cost".into(),
            "Created".into(),
            "Completed".into(),
        ])];

        for wo in orders {
            let property = self
                .property_name(ctx.organization_id, &mut properties, wo.property_id)
                .await;
            let assigned_to = match wo.assigned_to {
                Some(assignee) => self.assignee_name(ctx.organization_id, assignee).await,
                None => String::new(),
            };
            lines.push(row(&[
                wo.title,
                wo.category.as_str().into(),
                wo.priority.as_str().into(),
                wo.status.as_str().into(),
                property,
                assigned_to,
                fmt_opt_money(wo.estimated_cost),
                fmt_opt_money(wo.actual_cost),
                fmt_date(wo.created_at),
                fmt_opt_date(wo.completed_at),
            ]));
        }

        Ok(CsvFile {
            filename: filename("work-orders", Utc::now()),
            content: lines.join("\n") + "\n",
        })
    }
}
