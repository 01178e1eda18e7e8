//! Invoice domain model and the financial arithmetic.
//!
//! All derived fields (`total_amount`, `balance`, post-payment status)
//! flow through the pure functions in this module; every mutation path
//! calls [`recompute`] rather than re-deriving totals ad hoc, so the
//! financial invariants hold everywhere.
//!
//! `Overdue` is a derived classification (`due_date < now` with an
//! outstanding balance), never a stored status.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomariError, DomariResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    Draft,
    Open,
    PartiallyPaid,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "Draft",
            InvoiceStatus::Open => "Open",
            InvoiceStatus::PartiallyPaid => "PartiallyPaid",
            InvoiceStatus::Paid => "Paid",
            InvoiceStatus::Void => "Void",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(InvoiceStatus::Draft),
            "Open" => Some(InvoiceStatus::Open),
            "PartiallyPaid" => Some(InvoiceStatus::PartiallyPaid),
            "Paid" => Some(InvoiceStatus::Paid),
            "Void" => Some(InvoiceStatus::Void),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceType {
    Rent,
    Maintenance,
    Deposit,
    Utility,
    Other,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Rent => "Rent",
            InvoiceType::Maintenance => "Maintenance",
            InvoiceType::Deposit => "Deposit",
            InvoiceType::Utility => "Utility",
            InvoiceType::Other => "Other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Rent" => Some(InvoiceType::Rent),
            "Maintenance" => Some(InvoiceType::Maintenance),
            "Deposit" => Some(InvoiceType::Deposit),
            "Utility" => Some(InvoiceType::Utility),
            "Other" => Some(InvoiceType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// `quantity * unit_price`, rounded to 2 dp at creation.
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub property_id: Uuid,
    pub occupant_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub status: InvoiceStatus,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
    /// Percentage in `[0, 100]`.
    pub tax_rate: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub paid_amount: Decimal,
    pub balance: Decimal,
    /// Opaque hosted-payment URL; replaced wholesale on re-issue.
    pub payment_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInvoice {
    pub invoice_type: InvoiceType,
    pub property_id: Uuid,
    pub occupant_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub line_items: Vec<LineItemInput>,
    pub tax_rate: Decimal,
    pub discount_amount: Decimal,
    /// `true` opens the invoice immediately, otherwise it is a draft.
    pub open_immediately: bool,
}

/// A fully validated, fully computed invoice ready for persistence.
/// Produced by the Financial Document Engine; the repository only
/// stores it.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub invoice_type: InvoiceType,
    pub property_id: Uuid,
    pub occupant_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub status: InvoiceStatus,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
    pub tax_rate: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub invoice_type: Option<InvoiceType>,
    pub property_id: Option<Uuid>,
    pub occupant_id: Option<Uuid>,
    pub issued_from: Option<DateTime<Utc>>,
    pub issued_to: Option<DateTime<Utc>>,
}

/// Recomputed derived fields for a set of line items and payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_amount: Decimal,
    pub balance: Decimal,
}

/// Round to 2 decimal places, midpoint away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Recompute the derived financial fields:
/// `total = max(sum(items.total) * (1 + tax/100) - discount, 0)` and
/// `balance = max(total - paid, 0)`, both rounded to 2 dp.
pub fn recompute(line_items: &[LineItem], tax_rate: Decimal, discount: Decimal, paid: Decimal) -> Totals {
    let subtotal: Decimal = line_items.iter().map(|li| li.total).sum();
    let taxed = subtotal * (Decimal::ONE + tax_rate / Decimal::ONE_HUNDRED);
    let total_amount = round_money(taxed - discount).max(Decimal::ZERO);
    let balance = round_money(total_amount - paid).max(Decimal::ZERO);
    Totals {
        total_amount,
        balance,
    }
}

/// Status after a payment has been recorded against `total`.
pub fn status_after_payment(paid: Decimal, total: Decimal) -> InvoiceStatus {
    if paid >= total {
        InvoiceStatus::Paid
    } else if paid > Decimal::ZERO {
        InvoiceStatus::PartiallyPaid
    } else {
        InvoiceStatus::Open
    }
}

/// Validate a creation request and compute its line items and totals.
pub fn validate_create(input: &CreateInvoice) -> DomariResult<(Vec<LineItem>, Totals)> {
    if input.line_items.is_empty() {
        return Err(DomariError::validation("an invoice requires at least one line item"));
    }
    if input.tax_rate < Decimal::ZERO || input.tax_rate > Decimal::ONE_HUNDRED {
        return Err(DomariError::validation("tax_rate must be between 0 and 100"));
    }
    if input.discount_amount < Decimal::ZERO {
        return Err(DomariError::validation("discount_amount must not be negative"));
    }
    if input.issue_date > input.due_date {
        return Err(DomariError::validation("issue_date must not be after due_date"));
    }

    let mut items = Vec::with_capacity(input.line_items.len());
    for li in &input.line_items {
        if li.description.trim().is_empty() {
            return Err(DomariError::validation("line item description must not be empty"));
        }
        if li.quantity <= Decimal::ZERO {
            return Err(DomariError::validation("line item quantity must be positive"));
        }
        if li.unit_price < Decimal::ZERO {
            return Err(DomariError::validation("line item unit price must not be negative"));
        }
        items.push(LineItem {
            description: li.description.clone(),
            quantity: li.quantity,
            unit_price: li.unit_price,
            total: round_money(li.quantity * li.unit_price),
        });
    }

    let totals = recompute(&items, input.tax_rate, input.discount_amount, Decimal::ZERO);
    Ok((items, totals))
}

impl Invoice {
    /// Derived overdue classification; never stored.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now
            && self.balance > Decimal::ZERO
            && matches!(self.status, InvoiceStatus::Open | InvoiceStatus::PartiallyPaid)
    }

    /// Validate that a payment of `amount` may be recorded now.
    ///
    /// Overpayment is rejected outright rather than clamped: a silent
    /// clamp would misstate occupant credit.
    pub fn validate_payment(&self, amount: Decimal) -> DomariResult<()> {
        match self.status {
            InvoiceStatus::Draft => {
                return Err(DomariError::validation("cannot record a payment on a draft invoice"));
            }
            InvoiceStatus::Void => {
                return Err(DomariError::validation("cannot record a payment on a void invoice"));
            }
            InvoiceStatus::Paid => {
                return Err(DomariError::validation("invoice is already fully paid"));
            }
            InvoiceStatus::Open | InvoiceStatus::PartiallyPaid => {}
        }
        if amount <= Decimal::ZERO {
            return Err(DomariError::validation("payment amount must be positive"));
        }
        if amount > self.balance {
            return Err(DomariError::validation(format!(
                "payment of {amount} exceeds outstanding balance of {}",
                self.balance
            )));
        }
        Ok(())
    }
}
