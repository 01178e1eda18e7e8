//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Tenant-scoped repositories take
//! the caller's `org_id` on every call and are responsible for
//! injecting the organization filter into every query themselves — it
//! is never a caller-supplied predicate, so it cannot be forgotten.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::DomariResult;
use crate::models::{
    audit::{AuditLogEntry, CreateAuditLogEntry},
    invoice::{Invoice, InvoiceFilter, InvoiceStatus, NewInvoice},
    message::{CreateMessage, Message},
    notification::{CreateNotification, Notification},
    occupant::{CreateOccupant, Occupant, OccupantFilter},
    organization::{CreateOrganization, Organization, Plan, PlanStatus},
    property::{CreateProperty, Property, PropertyFilter, PropertyStatus, UpdateProperty},
    service_provider::{CreateServiceProvider, ServiceProvider},
    session::{CreateSession, Session},
    user::{CreateUser, UpdateUser, User},
    work_order::{Assignee, CreateWorkOrder, WorkOrder, WorkOrderFilter, WorkOrderStatus, WorkOrderUpdate},
};
use crate::query::Page;

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Organization & users (identity scope)
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = DomariResult<Organization>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomariResult<Organization>> + Send;

    fn get_by_subdomain(
        &self,
        subdomain: &str,
    ) -> impl Future<Output = DomariResult<Organization>> + Send;

    fn set_plan(
        &self,
        id: Uuid,
        plan: Plan,
        status: PlanStatus,
    ) -> impl Future<Output = DomariResult<Organization>> + Send;

    fn set_billing_refs(
        &self,
        id: Uuid,
        customer_ref: Option<String>,
        subscription_ref: Option<String>,
    ) -> impl Future<Output = DomariResult<Organization>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = DomariResult<User>> + Send;

    /// Global lookup; used by identity resolution before any tenant
    /// scope exists.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = DomariResult<User>> + Send;

    fn get_by_auth_ref(&self, auth_ref: &str) -> impl Future<Output = DomariResult<User>> + Send;

    fn get_in_org(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = DomariResult<User>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<User>>> + Send;

    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = DomariResult<User>> + Send;

    fn count_active(&self, org_id: Uuid) -> impl Future<Output = DomariResult<u64>> + Send;
}

pub trait SessionRepository: Send + Sync {
    fn create(&self, input: CreateSession) -> impl Future<Output = DomariResult<Session>> + Send;

    /// Global lookup by token hash; identity resolution happens before
    /// the organization is known.
    fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> impl Future<Output = DomariResult<Session>> + Send;

    fn invalidate(&self, id: Uuid) -> impl Future<Output = DomariResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Tenant-owned entities
// ---------------------------------------------------------------------------

pub trait PropertyRepository: Send + Sync {
    fn create(
        &self,
        org_id: Uuid,
        created_by: Uuid,
        input: CreateProperty,
    ) -> impl Future<Output = DomariResult<Property>> + Send;

    fn get(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = DomariResult<Property>> + Send;

    fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        input: UpdateProperty,
    ) -> impl Future<Output = DomariResult<Property>> + Send;

    fn set_status(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: PropertyStatus,
    ) -> impl Future<Output = DomariResult<Property>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        filter: PropertyFilter,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<Property>>> + Send;

    /// Properties counting against the plan quota (everything not
    /// `OffMarket`).
    fn count_active(&self, org_id: Uuid) -> impl Future<Output = DomariResult<u64>> + Send;

    /// Unpaginated projection for tabular export, ordered by creation
    /// time.
    fn list_in_range(
        &self,
        org_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> impl Future<Output = DomariResult<Vec<Property>>> + Send;
}

pub trait OccupantRepository: Send + Sync {
    fn create(
        &self,
        org_id: Uuid,
        input: CreateOccupant,
    ) -> impl Future<Output = DomariResult<Occupant>> + Send;

    fn get(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = DomariResult<Occupant>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        filter: OccupantFilter,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<Occupant>>> + Send;
}

pub trait ServiceProviderRepository: Send + Sync {
    fn create(
        &self,
        org_id: Uuid,
        input: CreateServiceProvider,
    ) -> impl Future<Output = DomariResult<ServiceProvider>> + Send;

    fn get(
        &self,
        org_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = DomariResult<ServiceProvider>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<ServiceProvider>>> + Send;
}

pub trait WorkOrderRepository: Send + Sync {
    fn create(
        &self,
        org_id: Uuid,
        input: CreateWorkOrder,
    ) -> impl Future<Output = DomariResult<WorkOrder>> + Send;

    fn get(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = DomariResult<WorkOrder>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        filter: WorkOrderFilter,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<WorkOrder>>> + Send;

    /// Persist a status transition, conditional on the previously read
    /// status. Returns `Ok(None)` when a concurrent transition moved
    /// the row first; the caller re-reads and re-validates.
    fn apply_transition(
        &self,
        org_id: Uuid,
        id: Uuid,
        from: WorkOrderStatus,
        to: WorkOrderStatus,
        assigned_to: Option<Assignee>,
        actual_cost: Option<Decimal>,
        completed_at: Option<DateTime<Utc>>,
    ) -> impl Future<Output = DomariResult<Option<WorkOrder>>> + Send;

    fn add_update(
        &self,
        entry: WorkOrderUpdate,
    ) -> impl Future<Output = DomariResult<WorkOrderUpdate>> + Send;

    fn list_updates(
        &self,
        org_id: Uuid,
        work_order_id: Uuid,
    ) -> impl Future<Output = DomariResult<Vec<WorkOrderUpdate>>> + Send;

    fn list_in_range(
        &self,
        org_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> impl Future<Output = DomariResult<Vec<WorkOrder>>> + Send;
}

pub trait InvoiceRepository: Send + Sync {
    fn create(
        &self,
        org_id: Uuid,
        input: NewInvoice,
    ) -> impl Future<Output = DomariResult<Invoice>> + Send;

    fn get(&self, org_id: Uuid, id: Uuid) -> impl Future<Output = DomariResult<Invoice>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        filter: InvoiceFilter,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<Invoice>>> + Send;

    /// Atomic read-modify-write for a payment: the update only applies
    /// while `paid_amount` still equals `expected_paid`. Returns
    /// `Ok(None)` on a concurrent-write miss; the caller re-reads,
    /// re-validates, and retries.
    fn apply_payment(
        &self,
        org_id: Uuid,
        id: Uuid,
        expected_paid: Decimal,
        new_paid: Decimal,
        new_balance: Decimal,
        new_status: InvoiceStatus,
    ) -> impl Future<Output = DomariResult<Option<Invoice>>> + Send;

    fn set_payment_link(
        &self,
        org_id: Uuid,
        id: Uuid,
        url: String,
    ) -> impl Future<Output = DomariResult<Invoice>> + Send;

    fn set_status(
        &self,
        org_id: Uuid,
        id: Uuid,
        status: InvoiceStatus,
    ) -> impl Future<Output = DomariResult<Invoice>> + Send;

    /// Unpaginated projection for tabular export, filtered on issue
    /// date and ordered by it.
    fn list_in_range(
        &self,
        org_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> impl Future<Output = DomariResult<Vec<Invoice>>> + Send;
}

// ---------------------------------------------------------------------------
// Messaging, notifications, audit
// ---------------------------------------------------------------------------

pub trait MessageRepository: Send + Sync {
    fn create(
        &self,
        org_id: Uuid,
        sender_id: Uuid,
        input: CreateMessage,
    ) -> impl Future<Output = DomariResult<Message>> + Send;

    fn list_for_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<Message>>> + Send;

    /// Mark the given messages read for `recipient_id`. Idempotent;
    /// returns how many rows matched.
    fn mark_read(
        &self,
        org_id: Uuid,
        recipient_id: Uuid,
        ids: Vec<Uuid>,
    ) -> impl Future<Output = DomariResult<u64>> + Send;
}

pub trait NotificationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateNotification,
    ) -> impl Future<Output = DomariResult<Notification>> + Send;

    fn list_for_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<Notification>>> + Send;

    /// Idempotent: marking an already-read notification is a no-op.
    fn mark_read(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = DomariResult<()>> + Send;
}

pub trait AuditLogRepository: Send + Sync {
    fn append(
        &self,
        entry: CreateAuditLogEntry,
    ) -> impl Future<Output = DomariResult<AuditLogEntry>> + Send;

    fn list(
        &self,
        org_id: Uuid,
        page: Page,
    ) -> impl Future<Output = DomariResult<PaginatedResult<AuditLogEntry>>> + Send;
}
