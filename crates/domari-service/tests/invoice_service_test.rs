//! Integration tests for the invoice engine against in-memory
//! SurrealDB: lifecycle, payments, payment links, and the overdue
//! sweep.

use std::str::FromStr;

use chrono::{Duration, Utc};
use domari_core::context::{AuthContext, Role};
use domari_core::error::{DomariError, DomariResult};
use domari_core::models::invoice::{CreateInvoice, InvoiceStatus, InvoiceType, LineItemInput};
use domari_core::models::notification::NotificationKind;
use domari_core::models::occupant::CreateOccupant;
use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::query::ListParams;
use domari_core::repository::{
    AuditLogRepository, NotificationRepository, OccupantRepository, OrganizationRepository,
};
use domari_db::repository::{
    SurrealAuditLogRepository, SurrealInvoiceRepository, SurrealNotificationRepository,
    SurrealOccupantRepository, SurrealOrganizationRepository,
};
use domari_service::invoices::InvoiceService;
use domari_service::payments::{PaymentGateway, PaymentLinkRequest};
use domari_service::sink::{AuditSink, NotificationSink};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

/// Gateway that always hands back the same hosted URL.
#[derive(Clone)]
struct StaticGateway {
    url: String,
}

impl PaymentGateway for StaticGateway {
    async fn create_payment_link(&self, _request: PaymentLinkRequest) -> DomariResult<String> {
        Ok(self.url.clone())
    }

    async fn create_portal_session(&self, _customer_ref: &str, _return_url: &str) -> DomariResult<String> {
        Ok(self.url.clone())
    }
}

/// Gateway that is always down.
#[derive(Clone)]
struct FailingGateway;

impl PaymentGateway for FailingGateway {
    async fn create_payment_link(&self, _request: PaymentLinkRequest) -> DomariResult<String> {
        Err(DomariError::ExternalService {
            service: "payments".into(),
            reason: "connection refused".into(),
        })
    }

    async fn create_portal_session(&self, _customer_ref: &str, _return_url: &str) -> DomariResult<String> {
        Err(DomariError::ExternalService {
            service: "payments".into(),
            reason: "connection refused".into(),
        })
    }
}

async fn setup() -> (Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domari_db::run_migrations(&db).await.unwrap();

    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Invoice Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    (db, org.id)
}

fn service<G: PaymentGateway>(
    db: &Surreal<Db>,
    gateway: G,
) -> InvoiceService<
    SurrealInvoiceRepository<surrealdb::engine::local::Db>,
    SurrealOccupantRepository<surrealdb::engine::local::Db>,
    G,
    SurrealAuditLogRepository<surrealdb::engine::local::Db>,
    SurrealNotificationRepository<surrealdb::engine::local::Db>,
> {
    InvoiceService::new(
        SurrealInvoiceRepository::new(db.clone()),
        SurrealOccupantRepository::new(db.clone()),
        gateway,
        AuditSink::new(SurrealAuditLogRepository::new(db.clone())),
        NotificationSink::new(SurrealNotificationRepository::new(db.clone())),
    )
}

fn ctx(org_id: Uuid, role: Role) -> AuthContext {
    AuthContext {
        user_id: Uuid::new_v4(),
        organization_id: org_id,
        role,
        full_name: "Avery Accountant".into(),
        email: "avery@example.com".into(),
    }
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// One rent line of 1000, 5% tax, 50 discount: total 1000.00.
fn rent_create(occupant_id: Option<Uuid>) -> CreateInvoice {
    CreateInvoice {
        invoice_type: InvoiceType::Rent,
        property_id: Uuid::new_v4(),
        occupant_id,
        work_order_id: None,
        issue_date: Utc::now(),
        due_date: Utc::now() + Duration::days(14),
        line_items: vec![LineItemInput {
            description: "Monthly rent".into(),
            quantity: Decimal::ONE,
            unit_price: dec("1000"),
        }],
        tax_rate: dec("5"),
        discount_amount: dec("50"),
        open_immediately: true,
    }
}

async fn create_occupant(db: &Surreal<Db>, org_id: Uuid) -> Uuid {
    SurrealOccupantRepository::new(db.clone())
        .create(
            org_id,
            CreateOccupant {
                property_id: Uuid::new_v4(),
                full_name: "Olive Occupant".into(),
                email: "olive@example.com".into(),
                phone: None,
                lease_start: Utc::now() - Duration::days(30),
                lease_end: Utc::now() + Duration::days(335),
                monthly_rent: dec("1000"),
                security_deposit: dec("1000"),
                emergency_contact: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn create_computes_totals_and_audits() {
    let (db, org_id) = setup().await;
    let svc = service(&db, StaticGateway { url: "https://pay.example/x".into() });
    let caller = ctx(org_id, Role::Accountant);

    let invoice = svc.create(&caller, rent_create(None)).await.unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Open);
    assert_eq!(invoice.total_amount, dec("1000.00"));
    assert_eq!(invoice.balance, dec("1000.00"));
    assert!(invoice.invoice_number.starts_with("INV-"));

    let mut draft = rent_create(None);
    draft.open_immediately = false;
    let draft = svc.create(&caller, draft).await.unwrap();
    assert_eq!(draft.status, InvoiceStatus::Draft);

    let audit = SurrealAuditLogRepository::new(db)
        .list(org_id, ListParams::default().normalize())
        .await
        .unwrap();
    assert_eq!(audit.total, 2);
}

#[tokio::test]
async fn viewer_cannot_create_invoices() {
    let (db, org_id) = setup().await;
    let svc = service(&db, FailingGateway);

    let err = svc
        .create(&ctx(org_id, Role::Viewer), rent_create(None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::AuthorizationDenied { .. }));

    let err = svc
        .create(&ctx(org_id, Role::Maintenance), rent_create(None))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::AuthorizationDenied { .. }));
}

#[tokio::test]
async fn payment_sequence_reaches_paid_and_notifies() {
    let (db, org_id) = setup().await;
    let svc = service(&db, FailingGateway);
    let caller = ctx(org_id, Role::Accountant);
    let invoice = svc.create(&caller, rent_create(None)).await.unwrap();

    let after_first = svc
        .record_payment(&caller, invoice.id, dec("400"), None)
        .await
        .unwrap();
    assert_eq!(after_first.status, InvoiceStatus::PartiallyPaid);
    assert_eq!(after_first.paid_amount, dec("400"));
    assert_eq!(after_first.balance, dec("600.00"));

    let after_second = svc
        .record_payment(&caller, invoice.id, dec("600"), None)
        .await
        .unwrap();
    assert_eq!(after_second.status, InvoiceStatus::Paid);
    assert_eq!(after_second.balance, Decimal::ZERO);

    let notifications = SurrealNotificationRepository::new(db)
        .list_for_user(org_id, caller.user_id, ListParams::default().normalize())
        .await
        .unwrap();
    assert_eq!(notifications.total, 2);
    assert!(
        notifications
            .items
            .iter()
            .all(|n| n.kind == NotificationKind::PaymentRecorded)
    );
}

#[tokio::test]
async fn overpayment_and_draft_payment_are_rejected() {
    let (db, org_id) = setup().await;
    let svc = service(&db, FailingGateway);
    let caller = ctx(org_id, Role::OrgAdmin);

    let invoice = svc.create(&caller, rent_create(None)).await.unwrap();
    let err = svc
        .record_payment(&caller, invoice.id, dec("1000.01"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));

    let mut draft = rent_create(None);
    draft.open_immediately = false;
    let draft = svc.create(&caller, draft).await.unwrap();
    let err = svc
        .record_payment(&caller, draft.id, dec("100"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn payment_link_is_issued_and_stored() {
    let (db, org_id) = setup().await;
    let occupant_id = create_occupant(&db, org_id).await;
    let svc = service(&db, StaticGateway { url: "https://pay.example/abc".into() });
    let caller = ctx(org_id, Role::Accountant);

    let invoice = svc.create(&caller, rent_create(Some(occupant_id))).await.unwrap();
    let updated = svc
        .issue_payment_link(&caller, invoice.id, "https://app.example/done".into())
        .await
        .unwrap();

    assert_eq!(updated.payment_link.as_deref(), Some("https://pay.example/abc"));
    // Totals are untouched by link issuance.
    assert_eq!(updated.balance, invoice.balance);
}

#[tokio::test]
async fn payment_link_requires_an_occupant() {
    let (db, org_id) = setup().await;
    let svc = service(&db, StaticGateway { url: "https://pay.example/abc".into() });
    let caller = ctx(org_id, Role::Accountant);

    let invoice = svc.create(&caller, rent_create(None)).await.unwrap();
    let err = svc
        .issue_payment_link(&caller, invoice.id, "https://app.example/done".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn gateway_failure_leaves_invoice_unchanged() {
    let (db, org_id) = setup().await;
    let occupant_id = create_occupant(&db, org_id).await;
    let svc = service(&db, FailingGateway);
    let caller = ctx(org_id, Role::Accountant);

    let invoice = svc.create(&caller, rent_create(Some(occupant_id))).await.unwrap();
    let err = svc
        .issue_payment_link(&caller, invoice.id, "https://app.example/done".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::ExternalService { .. }));

    let current = svc.get(&caller, invoice.id).await.unwrap();
    assert!(current.payment_link.is_none());
    assert_eq!(current.balance, invoice.balance);
}

#[tokio::test]
async fn void_rules() {
    let (db, org_id) = setup().await;
    let svc = service(&db, FailingGateway);
    let caller = ctx(org_id, Role::OrgAdmin);

    let invoice = svc.create(&caller, rent_create(None)).await.unwrap();
    let voided = svc.void(&caller, invoice.id).await.unwrap();
    assert_eq!(voided.status, InvoiceStatus::Void);

    // Re-voiding is a no-op, not an error.
    let again = svc.void(&caller, invoice.id).await.unwrap();
    assert_eq!(again.status, InvoiceStatus::Void);

    // A fully paid invoice cannot be voided.
    let paid = svc.create(&caller, rent_create(None)).await.unwrap();
    svc.record_payment(&caller, paid.id, dec("1000"), None).await.unwrap();
    let err = svc.void(&caller, paid.id).await.unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn overdue_sweep_finds_unpaid_past_due_invoices() {
    let (db, org_id) = setup().await;
    let svc = service(&db, FailingGateway);
    let caller = ctx(org_id, Role::Accountant);

    let mut past_due = rent_create(None);
    past_due.issue_date = Utc::now() - Duration::days(40);
    past_due.due_date = Utc::now() - Duration::days(10);
    let past_due = svc.create(&caller, past_due).await.unwrap();

    // Current invoice and a paid past-due one are not overdue.
    svc.create(&caller, rent_create(None)).await.unwrap();
    let mut settled = rent_create(None);
    settled.issue_date = Utc::now() - Duration::days(40);
    settled.due_date = Utc::now() - Duration::days(10);
    let settled = svc.create(&caller, settled).await.unwrap();
    svc.record_payment(&caller, settled.id, dec("1000"), None).await.unwrap();

    let overdue = svc.sweep_overdue(&caller, Utc::now()).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].id, past_due.id);

    let notifications = SurrealNotificationRepository::new(db)
        .list_for_user(org_id, caller.user_id, ListParams::default().normalize())
        .await
        .unwrap();
    assert!(
        notifications
            .items
            .iter()
            .any(|n| n.kind == NotificationKind::InvoiceOverdue)
    );
}
