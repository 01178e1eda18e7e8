//! Integration tests for the work order engine: transition rules,
//! history entries, and assignment notifications.

use std::str::FromStr;

use domari_core::context::{AuthContext, Role};
use domari_core::error::DomariError;
use domari_core::models::notification::NotificationKind;
use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::models::work_order::{
    Assignee, CreateWorkOrder, Priority, WorkOrderCategory, WorkOrderStatus,
};
use domari_core::query::ListParams;
use domari_core::repository::{NotificationRepository, OrganizationRepository};
use domari_db::repository::{
    SurrealAuditLogRepository, SurrealNotificationRepository, SurrealOrganizationRepository,
    SurrealWorkOrderRepository,
};
use domari_service::sink::{AuditSink, NotificationSink};
use domari_service::work_orders::{TransitionRequest, WorkOrderService};
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
            name: "Maintenance Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    (db, org.id)
}

fn service(
    db: &Surreal<Db>,
) -> WorkOrderService<
    SurrealWorkOrderRepository<surrealdb::engine::local::Db>,
    SurrealAuditLogRepository<surrealdb::engine::local::Db>,
    SurrealNotificationRepository<surrealdb::engine::local::Db>,
> {
    WorkOrderService::new(
        SurrealWorkOrderRepository::new(db.clone()),
        AuditSink::new(SurrealAuditLogRepository::new(db.clone())),
        NotificationSink::new(SurrealNotificationRepository::new(db.clone())),
    )
}

fn ctx(org_id: Uuid, role: Role) -> AuthContext {
    AuthContext {
        user_id: Uuid::new_v4(),
        organization_id: org_id,
        role,
        full_name: "Marty Maintenance".into(),
        email: "marty@example.com".into(),
    }
}

fn leak_report() -> CreateWorkOrder {
    CreateWorkOrder {
        property_id: Uuid::new_v4(),
        occupant_id: None,
        title: "Kitchen sink leaking".into(),
        description: "Water pooling under the cabinet".into(),
        category: WorkOrderCategory::Plumbing,
        priority: Priority::High,
        estimated_cost: Some(Decimal::from_str("150").unwrap()),
        due_at: None,
    }
}

fn req(to: WorkOrderStatus, message: &str) -> TransitionRequest {
    TransitionRequest {
        to,
        message: message.into(),
        assigned_to: None,
        actual_cost: None,
        image_refs: vec![],
    }
}

#[tokio::test]
async fn full_lifecycle_with_history_and_notification() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::PropertyManager);
    let technician = Uuid::new_v4();

    let order = svc.create(&caller, leak_report()).await.unwrap();
    assert_eq!(order.status, WorkOrderStatus::Open);
    assert!(order.assigned_to.is_none());

    let order = svc
        .transition(
            &caller,
            order.id,
            TransitionRequest {
                assigned_to: Some(Assignee::User(technician)),
                ..req(WorkOrderStatus::Assigned, "Assigning to in-house tech")
            },
        )
        .await
        .unwrap();
    assert_eq!(order.status, WorkOrderStatus::Assigned);
    assert_eq!(order.assigned_to, Some(Assignee::User(technician)));

    let order = svc
        .transition(&caller, order.id, req(WorkOrderStatus::InProgress, "On site"))
        .await
        .unwrap();
    let order = svc
        .transition(
            &caller,
            order.id,
            TransitionRequest {
                actual_cost: Some(Decimal::from_str("182.50").unwrap()),
                ..req(WorkOrderStatus::Completed, "Replaced trap and sealed")
            },
        )
        .await
        .unwrap();
    assert_eq!(order.actual_cost, Some(Decimal::from_str("182.50").unwrap()));
    assert!(order.completed_at.is_some());

    let order = svc
        .transition(&caller, order.id, req(WorkOrderStatus::Closed, "Verified with occupant"))
        .await
        .unwrap();
    assert_eq!(order.status, WorkOrderStatus::Closed);

    // Four transitions, oldest first.
    let history = svc.updates(&caller, order.id).await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].to_status, WorkOrderStatus::Assigned);
    assert_eq!(history[3].to_status, WorkOrderStatus::Closed);
    assert!(history.iter().all(|u| u.author_id == caller.user_id));

    // The assigned user was notified once.
    let notifications = SurrealNotificationRepository::new(db)
        .list_for_user(org_id, technician, ListParams::default().normalize())
        .await
        .unwrap();
    assert_eq!(notifications.total, 1);
    assert_eq!(notifications.items[0].kind, NotificationKind::WorkOrderAssigned);
}

#[tokio::test]
async fn assignment_rules() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::OrgAdmin);
    let order = svc.create(&caller, leak_report()).await.unwrap();

    // Assigning without an assignee is rejected.
    let err = svc
        .transition(&caller, order.id, req(WorkOrderStatus::Assigned, "Who though"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));

    // An assignee outside the Assigned transition is rejected.
    let err = svc
        .transition(
            &caller,
            order.id,
            TransitionRequest {
                assigned_to: Some(Assignee::Provider(Uuid::new_v4())),
                ..req(WorkOrderStatus::Cancelled, "Never mind")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn illegal_jumps_and_terminal_states_are_rejected() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::PropertyManager);
    let order = svc.create(&caller, leak_report()).await.unwrap();

    let err = svc
        .transition(&caller, order.id, req(WorkOrderStatus::Completed, "Skipping ahead"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));

    svc.transition(&caller, order.id, req(WorkOrderStatus::Cancelled, "Duplicate report"))
        .await
        .unwrap();
    let err = svc
        .transition(&caller, order.id, req(WorkOrderStatus::Assigned, "Reopening"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn transition_requires_a_message() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::Maintenance);
    let order = svc.create(&caller, leak_report()).await.unwrap();

    let err = svc
        .transition(&caller, order.id, req(WorkOrderStatus::Cancelled, "   "))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn actual_cost_only_on_completion() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::OrgAdmin);
    let order = svc.create(&caller, leak_report()).await.unwrap();

    let err = svc
        .transition(
            &caller,
            order.id,
            TransitionRequest {
                actual_cost: Some(Decimal::ONE),
                ..req(WorkOrderStatus::Cancelled, "Cancelling with a cost")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn images_only_on_completion() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::Maintenance);
    let order = svc.create(&caller, leak_report()).await.unwrap();

    let err = svc
        .transition(
            &caller,
            order.id,
            TransitionRequest {
                image_refs: vec!["before.jpg".into()],
                ..req(WorkOrderStatus::Cancelled, "Cancelling with photos")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));

    svc.transition(
        &caller,
        order.id,
        TransitionRequest {
            assigned_to: Some(Assignee::User(Uuid::new_v4())),
            ..req(WorkOrderStatus::Assigned, "Assigning")
        },
    )
    .await
    .unwrap();
    svc.transition(&caller, order.id, req(WorkOrderStatus::InProgress, "On site"))
        .await
        .unwrap();
    svc.transition(
        &caller,
        order.id,
        TransitionRequest {
            image_refs: vec!["after.jpg".into()],
            ..req(WorkOrderStatus::Completed, "Done, photo attached")
        },
    )
    .await
    .unwrap();

    let history = svc.updates(&caller, order.id).await.unwrap();
    let completed = history.last().unwrap();
    assert_eq!(completed.to_status, WorkOrderStatus::Completed);
    assert_eq!(completed.image_refs, vec!["after.jpg".to_string()]);
}

#[tokio::test]
async fn viewer_cannot_create_or_transition() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let admin = ctx(org_id, Role::OrgAdmin);
    let viewer = ctx(org_id, Role::Viewer);

    let order = svc.create(&admin, leak_report()).await.unwrap();

    let err = svc.create(&viewer, leak_report()).await.unwrap_err();
    assert!(matches!(err, DomariError::AuthorizationDenied { .. }));

    let err = svc
        .transition(&viewer, order.id, req(WorkOrderStatus::Cancelled, "No"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomariError::AuthorizationDenied { .. }));

    // Reads remain open.
    assert!(svc.get(&viewer, order.id).await.is_ok());
}

#[tokio::test]
async fn history_of_a_foreign_work_order_is_not_found() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let caller = ctx(org_id, Role::OrgAdmin);
    let order = svc.create(&caller, leak_report()).await.unwrap();

    let other_org = SurrealOrganizationRepository::new(db)
        .create(CreateOrganization {
            name: "Other Org".into(),
            plan: Plan::Starter,
        })
        .await
        .unwrap();
    let outsider = ctx(other_org.id, Role::OrgAdmin);

    let err = svc.updates(&outsider, order.id).await.unwrap_err();
    assert!(matches!(err, DomariError::NotFound { .. }));
}
