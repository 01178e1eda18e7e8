//! Integration tests for the WorkOrder repository using in-memory
//! SurrealDB, covering the conditional status transition.

use std::str::FromStr;

use chrono::Utc;
use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::models::work_order::{
    Assignee, CreateWorkOrder, Priority, WorkOrderCategory, WorkOrderFilter, WorkOrderStatus,
    WorkOrderUpdate,
};
use domari_core::query::ListParams;
use domari_core::repository::{OrganizationRepository, WorkOrderRepository};
use domari_db::repository::{SurrealOrganizationRepository, SurrealWorkOrderRepository};
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domari_db::run_migrations(&db).await.unwrap();

    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org = org_repo
        .create(CreateOrganization {
            name: "Maintenance Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    (db, org.id)
}

fn sample_order(title: &str, priority: Priority) -> CreateWorkOrder {
    CreateWorkOrder {
        property_id: Uuid::new_v4(),
        occupant_id: None,
        title: title.into(),
        description: "Kitchen sink leaking under the basin".into(),
        category: WorkOrderCategory::Plumbing,
        priority,
        estimated_cost: Some(Decimal::from_str("150").unwrap()),
        due_at: None,
    }
}

#[tokio::test]
async fn create_starts_open_and_unassigned() {
    let (db, org_id) = setup().await;
    let repo = SurrealWorkOrderRepository::new(db);

    let order = repo
        .create(org_id, sample_order("Leaky sink", Priority::High))
        .await
        .unwrap();

    assert_eq!(order.organization_id, org_id);
    assert_eq!(order.status, WorkOrderStatus::Open);
    assert!(order.assigned_to.is_none());
    assert!(order.actual_cost.is_none());
    assert!(order.completed_at.is_none());

    let fetched = repo.get(org_id, order.id).await.unwrap();
    assert_eq!(fetched.id, order.id);
}

#[tokio::test]
async fn transition_applies_and_records_assignee() {
    let (db, org_id) = setup().await;
    let repo = SurrealWorkOrderRepository::new(db);
    let order = repo
        .create(org_id, sample_order("Leaky sink", Priority::High))
        .await
        .unwrap();

    let assignee = Assignee::Provider(Uuid::new_v4());
    let assigned = repo
        .apply_transition(
            org_id,
            order.id,
            WorkOrderStatus::Open,
            WorkOrderStatus::Assigned,
            Some(assignee),
            None,
            None,
        )
        .await
        .unwrap()
        .expect("transition from the read status should apply");

    assert_eq!(assigned.status, WorkOrderStatus::Assigned);
    assert_eq!(assigned.assigned_to, Some(assignee));
}

#[tokio::test]
async fn stale_transition_is_a_no_op() {
    let (db, org_id) = setup().await;
    let repo = SurrealWorkOrderRepository::new(db);
    let order = repo
        .create(org_id, sample_order("Leaky sink", Priority::High))
        .await
        .unwrap();

    // First writer cancels the order.
    repo.apply_transition(
        org_id,
        order.id,
        WorkOrderStatus::Open,
        WorkOrderStatus::Cancelled,
        None,
        None,
        None,
    )
    .await
    .unwrap()
    .unwrap();

    // Second writer still believes the order is Open.
    let miss = repo
        .apply_transition(
            org_id,
            order.id,
            WorkOrderStatus::Open,
            WorkOrderStatus::Assigned,
            Some(Assignee::User(Uuid::new_v4())),
            None,
            None,
        )
        .await
        .unwrap();
    assert!(miss.is_none(), "stale transition must not apply");

    let current = repo.get(org_id, order.id).await.unwrap();
    assert_eq!(current.status, WorkOrderStatus::Cancelled);
    assert!(current.assigned_to.is_none());
}

#[tokio::test]
async fn completion_records_cost_and_timestamp() {
    let (db, org_id) = setup().await;
    let repo = SurrealWorkOrderRepository::new(db);
    let order = repo
        .create(org_id, sample_order("Leaky sink", Priority::High))
        .await
        .unwrap();

    for (from, to) in [
        (WorkOrderStatus::Open, WorkOrderStatus::Assigned),
        (WorkOrderStatus::Assigned, WorkOrderStatus::InProgress),
    ] {
        repo.apply_transition(org_id, order.id, from, to, None, None, None)
            .await
            .unwrap()
            .unwrap();
    }

    let completed_at = Utc::now();
    let done = repo
        .apply_transition(
            org_id,
            order.id,
            WorkOrderStatus::InProgress,
            WorkOrderStatus::Completed,
            None,
            Some(Decimal::from_str("182.50").unwrap()),
            Some(completed_at),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(done.status, WorkOrderStatus::Completed);
    assert_eq!(done.actual_cost, Some(Decimal::from_str("182.50").unwrap()));
    assert!(done.completed_at.is_some());
}

#[tokio::test]
async fn update_history_is_chronological() {
    let (db, org_id) = setup().await;
    let repo = SurrealWorkOrderRepository::new(db);
    let order = repo
        .create(org_id, sample_order("Leaky sink", Priority::High))
        .await
        .unwrap();
    let author = Uuid::new_v4();

    for (from, to, message) in [
        (WorkOrderStatus::Open, WorkOrderStatus::Assigned, "Assigned to plumber"),
        (WorkOrderStatus::Assigned, WorkOrderStatus::InProgress, "On site"),
    ] {
        repo.add_update(WorkOrderUpdate {
            id: Uuid::new_v4(),
            organization_id: org_id,
            work_order_id: order.id,
            author_id: author,
            from_status: from,
            to_status: to,
            message: message.into(),
            image_refs: vec![],
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    }

    let history = repo.list_updates(org_id, order.id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].message, "Assigned to plumber");
    assert_eq!(history[1].message, "On site");
    assert_eq!(history[1].from_status, WorkOrderStatus::Assigned);
}

#[tokio::test]
async fn default_list_order_puts_critical_first() {
    let (db, org_id) = setup().await;
    let repo = SurrealWorkOrderRepository::new(db);

    repo.create(org_id, sample_order("Low", Priority::Low))
        .await
        .unwrap();
    repo.create(org_id, sample_order("Critical", Priority::Critical))
        .await
        .unwrap();
    repo.create(org_id, sample_order("Medium", Priority::Medium))
        .await
        .unwrap();

    let listed = repo
        .list(
            org_id,
            WorkOrderFilter::default(),
            ListParams::default().normalize(),
        )
        .await
        .unwrap();

    let titles: Vec<&str> = listed.items.iter().map(|o| o.title.as_str()).collect();
    assert_eq!(titles, vec!["Critical", "Medium", "Low"]);
}

#[tokio::test]
async fn work_orders_are_invisible_across_organizations() {
    let (db, org_a) = setup().await;
    let org_repo = SurrealOrganizationRepository::new(db.clone());
    let org_b = org_repo
        .create(CreateOrganization {
            name: "Other Org".into(),
            plan: Plan::Starter,
        })
        .await
        .unwrap();

    let repo = SurrealWorkOrderRepository::new(db);
    let order = repo
        .create(org_a, sample_order("Private", Priority::Medium))
        .await
        .unwrap();

    assert!(repo.get(org_b.id, order.id).await.is_err());

    let miss = repo
        .apply_transition(
            org_b.id,
            order.id,
            WorkOrderStatus::Open,
            WorkOrderStatus::Cancelled,
            None,
            None,
            None,
        )
        .await
        .unwrap();
    assert!(miss.is_none(), "cross-org transition must not apply");
}
