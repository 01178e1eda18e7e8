//! Integration tests for the CSV export: role gate, quoting, and name
//! denormalization.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use domari_core::context::{AuthContext, Role};
use domari_core::error::DomariError;
use domari_core::models::invoice::{InvoiceStatus, InvoiceType, LineItem, NewInvoice, recompute};
use domari_core::models::occupant::CreateOccupant;
use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::models::property::{CreateProperty, PropertyType};
use domari_core::models::service_provider::CreateServiceProvider;
use domari_core::models::work_order::{
    Assignee, CreateWorkOrder, Priority, WorkOrderCategory, WorkOrderStatus,
};
use domari_core::repository::{
    InvoiceRepository, OccupantRepository, OrganizationRepository, PropertyRepository,
    ServiceProviderRepository, WorkOrderRepository,
};
use domari_db::repository::{
    SurrealInvoiceRepository, SurrealOccupantRepository, SurrealOrganizationRepository,
    SurrealPropertyRepository, SurrealServiceProviderRepository, SurrealUserRepository,
    SurrealWorkOrderRepository,
};
use domari_service::export::ExportService;
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domari_db::run_migrations(&db).await.unwrap();

    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Export Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    (db, org.id)
}

type Exporter = ExportService<
    SurrealInvoiceRepository<surrealdb::engine::local::Db>,
    SurrealPropertyRepository<surrealdb::engine::local::Db>,
    SurrealOccupantRepository<surrealdb::engine::local::Db>,
    SurrealWorkOrderRepository<surrealdb::engine::local::Db>,
    SurrealUserRepository<surrealdb::engine::local::Db>,
    SurrealServiceProviderRepository<surrealdb::engine::local::Db>,
>;

fn service(db: &Surreal<Db>) -> Exporter {
    ExportService::new(
        SurrealInvoiceRepository::new(db.clone()),
        SurrealPropertyRepository::new(db.clone()),
        SurrealOccupantRepository::new(db.clone()),
        SurrealWorkOrderRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealServiceProviderRepository::new(db.clone()),
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

async fn create_property(db: &Surreal<Db>, org_id: Uuid, name: &str) -> Uuid {
    SurrealPropertyRepository::new(db.clone())
        .create(
            org_id,
            Uuid::new_v4(),
            CreateProperty {
                name: name.into(),
                address_line1: "12 \"Oak\" St".into(),
                city: "Springfield".into(),
                state: "IL".into(),
                postal_code: "62704".into(),
                property_type: PropertyType::SingleFamily,
                bedrooms: 3,
                bathrooms: 2.0,
                square_feet: None,
                year_built: None,
                monthly_rent: dec("1500"),
                purchase_price: None,
                amenities: vec![],
            },
        )
        .await
        .unwrap()
        .id
}

async fn create_invoice(
    db: &Surreal<Db>,
    org_id: Uuid,
    property_id: Uuid,
    number: &str,
    issue_date: DateTime<Utc>,
) {
    let items = vec![LineItem {
        description: "Monthly rent".into(),
        quantity: Decimal::ONE,
        unit_price: dec("1500"),
        total: dec("1500"),
    }];
    let totals = recompute(&items, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    SurrealInvoiceRepository::new(db.clone())
        .create(
            org_id,
            NewInvoice {
                invoice_number: number.into(),
                invoice_type: InvoiceType::Rent,
                property_id,
                occupant_id: None,
                work_order_id: None,
                status: InvoiceStatus::Open,
                issue_date,
                due_date: issue_date + Duration::days(14),
                line_items: items,
                tax_rate: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                total_amount: totals.total_amount,
                balance: totals.balance,
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn invoice_export_denormalizes_names_and_quotes_cells() {
    let (db, org_id) = setup().await;
    let property_id = create_property(&db, org_id, "Maple House").await;
    let occupant = SurrealOccupantRepository::new(db.clone())
        .create(
            org_id,
            CreateOccupant {
                property_id,
                full_name: "Olive Occupant".into(),
                email: "olive@example.com".into(),
                phone: None,
                lease_start: Utc::now() - Duration::days(30),
                lease_end: Utc::now() + Duration::days(335),
                monthly_rent: dec("1500"),
                security_deposit: dec("1500"),
                emergency_contact: None,
            },
        )
        .await
        .unwrap();

    let items = vec![LineItem {
        description: "Monthly rent".into(),
        quantity: Decimal::ONE,
        unit_price: dec("1500"),
        total: dec("1500"),
    }];
    let totals = recompute(&items, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO);
    SurrealInvoiceRepository::new(db.clone())
        .create(
            org_id,
            NewInvoice {
                invoice_number: "INV-0001".into(),
                invoice_type: InvoiceType::Rent,
                property_id,
                occupant_id: Some(occupant.id),
                work_order_id: None,
                status: InvoiceStatus::Open,
                issue_date: Utc::now(),
                due_date: Utc::now() + Duration::days(14),
                line_items: items,
                tax_rate: Decimal::ZERO,
                discount_amount: Decimal::ZERO,
                total_amount: totals.total_amount,
                balance: totals.balance,
            },
        )
        .await
        .unwrap();

    let svc = service(&db);
    let csv = svc
        .export_invoices(&ctx(org_id, Role::Accountant), None, None)
        .await
        .unwrap();

    assert!(csv.filename.starts_with("domari-invoices-"));
    assert!(csv.filename.ends_with(".csv"));

    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("\"Invoice #\",\"Type\",\"Status\""));
    assert!(lines[1].contains("\"INV-0001\""));
    assert!(lines[1].contains("\"Maple House\""));
    assert!(lines[1].contains("\"Olive Occupant\""));
    assert!(lines[1].contains("\"1500.00\""));
}

#[tokio::test]
async fn invoice_export_honors_both_range_bounds() {
    let (db, org_id) = setup().await;
    let property_id = create_property(&db, org_id, "Range House").await;

    let now = Utc::now();
    create_invoice(&db, org_id, property_id, "INV-EARLY", now - Duration::days(30)).await;
    create_invoice(&db, org_id, property_id, "INV-IN", now - Duration::days(10)).await;
    create_invoice(&db, org_id, property_id, "INV-LATE", now).await;

    let svc = service(&db);
    let csv = svc
        .export_invoices(
            &ctx(org_id, Role::Accountant),
            Some(now - Duration::days(15)),
            Some(now - Duration::days(5)),
        )
        .await
        .unwrap();

    // Header plus exactly the one invoice issued inside the window;
    // the earlier and later invoices fall outside either bound.
    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"INV-IN\""));

    // No bounds: all three rows come back.
    let csv = svc
        .export_invoices(&ctx(org_id, Role::Accountant), None, None)
        .await
        .unwrap();
    assert_eq!(csv.content.lines().count(), 4);
}

#[tokio::test]
async fn property_export_escapes_embedded_quotes() {
    let (db, org_id) = setup().await;
    create_property(&db, org_id, "Quoted House").await;

    let svc = service(&db);
    let csv = svc
        .export_properties(&ctx(org_id, Role::OrgAdmin), None, None)
        .await
        .unwrap();

    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines.len(), 2);
    // The street address contains literal double quotes.
    assert!(lines[1].contains("\"12 \"\"Oak\"\" St\""));
    assert!(lines[1].contains("\"1500.00\""));
}

#[tokio::test]
async fn work_order_export_resolves_the_provider_name() {
    let (db, org_id) = setup().await;
    let property_id = create_property(&db, org_id, "Maple House").await;
    let provider = SurrealServiceProviderRepository::new(db.clone())
        .create(
            org_id,
            CreateServiceProvider {
                name: "Fast Plumbing Co".into(),
                email: None,
                phone: None,
                specialties: vec![WorkOrderCategory::Plumbing],
                hourly_rate: Some(dec("95")),
            },
        )
        .await
        .unwrap();

    let wo_repo = SurrealWorkOrderRepository::new(db.clone());
    let order = wo_repo
        .create(
            org_id,
            CreateWorkOrder {
                property_id,
                occupant_id: None,
                title: "Leaking sink".into(),
                description: "Kitchen".into(),
                category: WorkOrderCategory::Plumbing,
                priority: Priority::High,
                estimated_cost: Some(dec("150")),
                due_at: None,
            },
        )
        .await
        .unwrap();
    wo_repo
        .apply_transition(
            org_id,
            order.id,
            WorkOrderStatus::Open,
            WorkOrderStatus::Assigned,
            Some(Assignee::Provider(provider.id)),
            None,
            None,
        )
        .await
        .unwrap()
        .unwrap();

    let svc = service(&db);
    let csv = svc
        .export_work_orders(&ctx(org_id, Role::PropertyManager), None, None)
        .await
        .unwrap();

    let lines: Vec<&str> = csv.content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"Fast Plumbing Co\""));
    assert!(lines[1].contains("\"Maple House\""));
    assert!(lines[1].contains("\"150.00\""));
    // No completion yet: the Completed cell is empty.
    assert!(lines[1].ends_with("\"\""));
}

#[tokio::test]
async fn export_is_gated_to_reporting_roles() {
    let (db, org_id) = setup().await;
    let svc = service(&db);

    for role in [Role::Viewer, Role::Maintenance] {
        let err = svc.export_invoices(&ctx(org_id, role), None, None).await.unwrap_err();
        assert!(matches!(err, DomariError::AuthorizationDenied { .. }), "{role:?}");
    }

    assert!(svc.export_invoices(&ctx(org_id, Role::Accountant), None, None).await.is_ok());
}
