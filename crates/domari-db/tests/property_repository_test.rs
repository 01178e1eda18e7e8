//! Integration tests for the Property repository using in-memory
//! SurrealDB.

use std::str::FromStr;

use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::models::property::{CreateProperty, PropertyStatus, PropertyType, PropertyFilter, UpdateProperty};
use domari_core::query::{ListParams, SortOrder};
use domari_core::repository::{OrganizationRepository, PropertyRepository};
use domari_db::repository::{SurrealOrganizationRepository, SurrealPropertyRepository};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create an org.
async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domari_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrganization {
            name: "Test Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    (db, org.id)
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_property(name: &str, rent: &str) -> CreateProperty {
    CreateProperty {
        name: name.into(),
        address_line1: "12 Oak Street".into(),
        city: "Springfield".into(),
        state: "IL".into(),
        postal_code: "62704".into(),
        property_type: PropertyType::SingleFamily,
        bedrooms: 3,
        bathrooms: 2.0,
        square_feet: Some(1400),
        year_built: Some(1998),
        monthly_rent: dec(rent),
        purchase_price: None,
        amenities: vec!["parking".into()],
    }
}

#[tokio::test]
async fn create_and_get_property() {
    let (db, org_id) = setup().await;
    let repo = SurrealPropertyRepository::new(db);
    let manager = Uuid::new_v4();

    let property = repo
        .create(org_id, manager, sample_property("Oak House", "1450"))
        .await
        .unwrap();

    assert_eq!(property.organization_id, org_id);
    assert_eq!(property.name, "Oak House");
    assert_eq!(property.status, PropertyStatus::Available);
    assert_eq!(property.monthly_rent, dec("1450"));
    assert_eq!(property.created_by, manager);

    let fetched = repo.get(org_id, property.id).await.unwrap();
    assert_eq!(fetched.id, property.id);
}

#[tokio::test]
async fn organization_isolation() {
    let (db, org_a) = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org_b = org_repo
        .create(CreateOrganization {
            name: "Other Org".into(),
            plan: Plan::Starter,
        })
        .await
        .unwrap();

    let repo = SurrealPropertyRepository::new(db);
    let property = repo
        .create(org_a, Uuid::new_v4(), sample_property("Hidden", "900"))
        .await
        .unwrap();

    // Visible in its own org.
    assert!(repo.get(org_a, property.id).await.is_ok());

    // Invisible from the other org.
    let not_found = repo.get(org_b.id, property.id).await;
    assert!(
        not_found.is_err(),
        "property should not be visible across organizations"
    );
}

#[tokio::test]
async fn update_changes_only_provided_fields() {
    let (db, org_id) = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let property = repo
        .create(org_id, Uuid::new_v4(), sample_property("Before", "1000"))
        .await
        .unwrap();

    let updated = repo
        .update(
            org_id,
            property.id,
            UpdateProperty {
                monthly_rent: Some(dec("1100")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.monthly_rent, dec("1100"));
    assert_eq!(updated.name, "Before"); // unchanged
}

#[tokio::test]
async fn list_with_pagination_and_search() {
    let (db, org_id) = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    for i in 0..5 {
        repo.create(
            org_id,
            Uuid::new_v4(),
            sample_property(&format!("Maple Unit {i}"), "1000"),
        )
        .await
        .unwrap();
    }
    repo.create(org_id, Uuid::new_v4(), sample_property("Cedar Loft", "2000"))
        .await
        .unwrap();

    let page1 = repo
        .list(
            org_id,
            PropertyFilter::default(),
            ListParams {
                limit: Some(4),
                ..Default::default()
            }
            .normalize(),
        )
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 4);
    assert_eq!(page1.total, 6);

    let page2 = repo
        .list(
            org_id,
            PropertyFilter::default(),
            ListParams {
                page: Some(2),
                limit: Some(4),
                ..Default::default()
            }
            .normalize(),
        )
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);

    // Search is case-insensitive partial match.
    let maples = repo
        .list(
            org_id,
            PropertyFilter::default(),
            ListParams {
                search: Some("MAPLE".into()),
                ..Default::default()
            }
            .normalize(),
        )
        .await
        .unwrap();
    assert_eq!(maples.total, 5);
}

#[tokio::test]
async fn list_sorts_by_whitelisted_column() {
    let (db, org_id) = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    for name in ["Charlie", "Alpha", "Bravo"] {
        repo.create(org_id, Uuid::new_v4(), sample_property(name, "1000"))
            .await
            .unwrap();
    }

    let sorted = repo
        .list(
            org_id,
            PropertyFilter::default(),
            ListParams {
                sort_by: Some("name".into()),
                sort_order: Some(SortOrder::Asc),
                ..Default::default()
            }
            .normalize(),
        )
        .await
        .unwrap();

    let names: Vec<&str> = sorted.items.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Bravo", "Charlie"]);
}

#[tokio::test]
async fn status_filter_applies() {
    let (db, org_id) = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let a = repo
        .create(org_id, Uuid::new_v4(), sample_property("A", "1000"))
        .await
        .unwrap();
    repo.create(org_id, Uuid::new_v4(), sample_property("B", "1000"))
        .await
        .unwrap();

    repo.set_status(org_id, a.id, PropertyStatus::Occupied)
        .await
        .unwrap();

    let occupied = repo
        .list(
            org_id,
            PropertyFilter {
                status: Some(PropertyStatus::Occupied),
                ..Default::default()
            },
            ListParams::default().normalize(),
        )
        .await
        .unwrap();
    assert_eq!(occupied.total, 1);
    assert_eq!(occupied.items[0].id, a.id);
}

#[tokio::test]
async fn off_market_does_not_count_against_quota() {
    let (db, org_id) = setup().await;
    let repo = SurrealPropertyRepository::new(db);

    let a = repo
        .create(org_id, Uuid::new_v4(), sample_property("A", "1000"))
        .await
        .unwrap();
    repo.create(org_id, Uuid::new_v4(), sample_property("B", "1000"))
        .await
        .unwrap();
    assert_eq!(repo.count_active(org_id).await.unwrap(), 2);

    repo.set_status(org_id, a.id, PropertyStatus::OffMarket)
        .await
        .unwrap();
    assert_eq!(repo.count_active(org_id).await.unwrap(), 1);
}
