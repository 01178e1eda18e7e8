//! Financial document engine — invoice creation, payments, payment
//! links, voiding, and overdue detection.
//!
//! All derived amounts flow through the pure arithmetic in
//! `domari_core::models::invoice`. Payment recording is optimistic:
//! the conditional repository update only applies while `paid_amount`
//! still equals what this request read, and a miss triggers a bounded
//! re-read-and-retry.

use chrono::{DateTime, Utc};
use domari_core::context::{AuthContext, Role, require_role};
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::audit::AuditAction;
use domari_core::models::invoice::{
    self, CreateInvoice, Invoice, InvoiceFilter, InvoiceStatus, NewInvoice,
};
use domari_core::models::notification::NotificationKind;
use domari_core::query::Page;
use domari_core::repository::{
    AuditLogRepository, InvoiceRepository, NotificationRepository, OccupantRepository,
    PaginatedResult,
};
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::payments::{PaymentGateway, PaymentLinkRequest, to_minor_units};
use crate::sink::{AuditSink, NotificationSink};

const BILLING_ROLES: &[Role] = &[Role::OrgAdmin, Role::PropertyManager, Role::Accountant];

/// Retry budget for the optimistic payment update.
const PAYMENT_RETRIES: usize = 3;

fn generate_invoice_number() -> String {
    let n: u32 = rand::thread_rng().r#gen();
    format!("INV-{n:08X}")
}

pub struct InvoiceService<I, Oc, G, A, N>
where
    I: InvoiceRepository,
    Oc: OccupantRepository,
    G: PaymentGateway,
    A: AuditLogRepository,
    N: NotificationRepository,
{
    invoices: I,
    occupants: Oc,
    gateway: G,
    audit: AuditSink<A>,
    notifications: NotificationSink<N>,
}

impl<I, Oc, G, A, N> InvoiceService<I, Oc, G, A, N>
where
    I: InvoiceRepository,
    Oc: OccupantRepository,
    G: PaymentGateway,
    A: AuditLogRepository,
    N: NotificationRepository,
{
    pub fn new(
        invoices: I,
        occupants: Oc,
        gateway: G,
        audit: AuditSink<A>,
        notifications: NotificationSink<N>,
    ) -> Self {
        Self {
            invoices,
            occupants,
            gateway,
            audit,
            notifications,
        }
    }

    /// Validate, compute totals, and persist a new invoice.
    pub async fn create(&self, ctx: &AuthContext, input: CreateInvoice) -> DomariResult<Invoice> {
        require_role(ctx, BILLING_ROLES)?;
        let (line_items, totals) = invoice::validate_create(&input)?;
        if let Some(occupant_id) = input.occupant_id {
            self.occupants.get(ctx.organization_id, occupant_id).await?;
        }

        let status = if input.open_immediately {
            InvoiceStatus::Open
        } else {
            InvoiceStatus::Draft
        };

        let created = self
            .invoices
            .create(
                ctx.organization_id,
                NewInvoice {
                    invoice_number: generate_invoice_number(),
                    invoice_type: input.invoice_type,
                    property_id: input.property_id,
                    occupant_id: input.occupant_id,
                    work_order_id: input.work_order_id,
                    status,
                    issue_date: input.issue_date,
                    due_date: input.due_date,
                    line_items,
                    tax_rate: input.tax_rate,
                    discount_amount: input.discount_amount,
                    total_amount: totals.total_amount,
                    balance: totals.balance,
                },
            )
            .await?;

        self.audit
            .record(
                ctx,
                AuditAction::Create,
                "invoice",
                created.id,
                serde_json::json!({
                    "invoice_number": created.invoice_number,
                    "total_amount": created.total_amount.to_string(),
                }),
            )
            .await;

        Ok(created)
    }

    pub async fn get(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<Invoice> {
        self.invoices.get(ctx.organization_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: InvoiceFilter,
        page: Page,
    ) -> DomariResult<PaginatedResult<Invoice>> {
        self.invoices.list(ctx.organization_id, filter, page).await
    }

    /// Record a payment against an open invoice.
    ///
    /// Each attempt re-reads, re-validates, and recomputes from the
    /// freshly read state; the conditional update makes a lost read
    /// harmless.
    pub async fn record_payment(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        amount: Decimal,
        paid_on: Option<DateTime<Utc>>,
    ) -> DomariResult<Invoice> {
        require_role(ctx, BILLING_ROLES)?;

        for _ in 0..PAYMENT_RETRIES {
            let current = self.invoices.get(ctx.organization_id, id).await?;
            current.validate_payment(amount)?;

            let new_paid = invoice::round_money(current.paid_amount + amount);
            let totals = invoice::recompute(
                &current.line_items,
                current.tax_rate,
                current.discount_amount,
                new_paid,
            );
            let new_status = invoice::status_after_payment(new_paid, totals.total_amount);

            let applied = self
                .invoices
                .apply_payment(
                    ctx.organization_id,
                    id,
                    current.paid_amount,
                    new_paid,
                    totals.balance,
                    new_status,
                )
                .await?;

            if let Some(updated) = applied {
                self.audit
                    .record(
                        ctx,
                        AuditAction::PaymentRecorded,
                        "invoice",
                        updated.id,
                        serde_json::json!({
                            "amount": amount.to_string(),
                            "paid_on": paid_on.unwrap_or_else(Utc::now),
                            "balance": updated.balance.to_string(),
                            "status": updated.status.as_str(),
                        }),
                    )
                    .await;
                self.notifications
                    .notify(
                        ctx.organization_id,
                        ctx.user_id,
                        NotificationKind::PaymentRecorded,
                        serde_json::json!({
                            "invoice_number": updated.invoice_number,
                            "amount": amount.to_string(),
                        }),
                    )
                    .await;
                return Ok(updated);
            }
            // Lost the race; loop re-reads and re-validates.
        }

        Err(DomariError::validation(
            "invoice was modified concurrently; retry the payment",
        ))
    }

    /// Ask the payment collaborator for a hosted link and persist it.
    ///
    /// Re-issuing replaces the previous link wholesale. Totals are
    /// never touched, and a gateway failure leaves the invoice
    /// unchanged.
    pub async fn issue_payment_link(
        &self,
        ctx: &AuthContext,
        id: Uuid,
        success_url: String,
    ) -> DomariResult<Invoice> {
        require_role(ctx, BILLING_ROLES)?;
        let current = self.invoices.get(ctx.organization_id, id).await?;

        match current.status {
            InvoiceStatus::Paid => {
                return Err(DomariError::validation("invoice is already fully paid"));
            }
            InvoiceStatus::Void => {
                return Err(DomariError::validation("cannot collect on a void invoice"));
            }
            _ => {}
        }
        if current.balance <= Decimal::ZERO {
            return Err(DomariError::validation("invoice has no outstanding balance"));
        }
        let occupant_id = current.occupant_id.ok_or_else(|| {
            DomariError::validation("invoice has no occupant to send a payment link to")
        })?;
        let occupant = self.occupants.get(ctx.organization_id, occupant_id).await?;

        let url = self
            .gateway
            .create_payment_link(PaymentLinkRequest {
                amount_minor_units: to_minor_units(current.balance)?,
                description: format!("Invoice {}", current.invoice_number),
                payer_email: occupant.email,
                reference_id: current.id.to_string(),
                success_url,
            })
            .await?;

        let updated = self
            .invoices
            .set_payment_link(ctx.organization_id, id, url)
            .await?;

        self.audit
            .record(
                ctx,
                AuditAction::PaymentLinkIssued,
                "invoice",
                updated.id,
                serde_json::json!({ "invoice_number": updated.invoice_number }),
            )
            .await;

        Ok(updated)
    }

    /// Void an invoice. Any non-`Paid` invoice can be voided; voiding
    /// an already-void invoice is a no-op.
    pub async fn void(&self, ctx: &AuthContext, id: Uuid) -> DomariResult<Invoice> {
        require_role(ctx, BILLING_ROLES)?;
        let current = self.invoices.get(ctx.organization_id, id).await?;

        if current.status == InvoiceStatus::Paid {
            return Err(DomariError::validation("a paid invoice cannot be voided"));
        }
        if current.status == InvoiceStatus::Void {
            return Ok(current);
        }

        let updated = self
            .invoices
            .set_status(ctx.organization_id, id, InvoiceStatus::Void)
            .await?;

        self.audit
            .record(
                ctx,
                AuditAction::StatusChange,
                "invoice",
                updated.id,
                serde_json::json!({
                    "from": current.status.as_str(),
                    "to": InvoiceStatus::Void.as_str(),
                }),
            )
            .await;

        Ok(updated)
    }

    /// Derive the currently overdue invoices and notify the caller
    /// about each. Overdue is never stored.
    pub async fn sweep_overdue(&self, ctx: &AuthContext, now: DateTime<Utc>) -> DomariResult<Vec<Invoice>> {
        require_role(ctx, BILLING_ROLES)?;
        let overdue: Vec<Invoice> = self
            .invoices
            .list_in_range(ctx.organization_id, None, None)
            .await?
            .into_iter()
            .filter(|inv| inv.is_overdue(now))
            .collect();

        for inv in &overdue {
            self.notifications
                .notify(
                    ctx.organization_id,
                    ctx.user_id,
                    NotificationKind::InvoiceOverdue,
                    serde_json::json!({
                        "invoice_number": inv.invoice_number,
                        "balance": inv.balance.to_string(),
                        "due_date": inv.due_date,
                    }),
                )
                .await;
        }

        Ok(overdue)
    }
}
