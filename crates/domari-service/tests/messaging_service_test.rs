//! Integration tests for the messaging engine: delivery, validation,
//! and the received-message notification.

use domari_core::context::{AuthContext, Role};
use domari_core::error::DomariError;
use domari_core::models::message::CreateMessage;
use domari_core::models::notification::NotificationKind;
use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::models::user::CreateUser;
use domari_core::query::ListParams;
use domari_core::repository::{NotificationRepository, OrganizationRepository, UserRepository};
use domari_db::repository::{
    SurrealMessageRepository, SurrealNotificationRepository, SurrealOrganizationRepository,
    SurrealUserRepository,
};
use domari_service::messaging::MessagingService;
use domari_service::sink::NotificationSink;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn create_user(db: &Surreal<Db>, org_id: Uuid, name: &str) -> AuthContext {
    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            auth_ref: format!("auth0|{name}"),
            organization_id: org_id,
            full_name: name.into(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            role: Role::PropertyManager,
        })
        .await
        .unwrap();
    AuthContext {
        user_id: user.id,
        organization_id: org_id,
        role: user.role,
        full_name: user.full_name,
        email: user.email,
    }
}

async fn setup() -> (Surreal<Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domari_db::run_migrations(&db).await.unwrap();

    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Messaging Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    (db, org.id)
}

fn service(
    db: &Surreal<Db>,
) -> MessagingService<
    SurrealMessageRepository<surrealdb::engine::local::Db>,
    SurrealUserRepository<surrealdb::engine::local::Db>,
    SurrealNotificationRepository<surrealdb::engine::local::Db>,
> {
    MessagingService::new(
        SurrealMessageRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        NotificationSink::new(SurrealNotificationRepository::new(db.clone())),
    )
}

fn note(recipient_id: Uuid, subject: &str) -> CreateMessage {
    CreateMessage {
        recipient_id,
        subject: subject.into(),
        body: "Please check unit 4B this week.".into(),
        thread_id: None,
    }
}

#[tokio::test]
async fn send_delivers_and_notifies_the_recipient() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let sender = create_user(&db, org_id, "Sam Sender").await;
    let recipient = create_user(&db, org_id, "Rae Recipient").await;

    let message = svc
        .send(&sender, note(recipient.user_id, "Inspection"))
        .await
        .unwrap();
    assert_eq!(message.sender_id, sender.user_id);
    assert!(!message.is_read);

    // Both participants see the message in their list.
    for who in [&sender, &recipient] {
        let listed = svc.list(who, ListParams::default().normalize()).await.unwrap();
        assert_eq!(listed.total, 1, "{} should see the message", who.full_name);
    }

    let notifications = SurrealNotificationRepository::new(db)
        .list_for_user(org_id, recipient.user_id, ListParams::default().normalize())
        .await
        .unwrap();
    assert_eq!(notifications.total, 1);
    assert_eq!(notifications.items[0].kind, NotificationKind::MessageReceived);
    assert_eq!(notifications.items[0].payload["sender"], "Sam Sender");
}

#[tokio::test]
async fn self_send_and_blank_subject_are_rejected() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let sender = create_user(&db, org_id, "Sam Sender").await;
    let recipient = create_user(&db, org_id, "Rae Recipient").await;

    let err = svc.send(&sender, note(sender.user_id, "Me again")).await.unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));

    let err = svc.send(&sender, note(recipient.user_id, "  ")).await.unwrap_err();
    assert!(matches!(err, DomariError::Validation { .. }));
}

#[tokio::test]
async fn cross_org_recipients_do_not_exist() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let sender = create_user(&db, org_id, "Sam Sender").await;

    let other_org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Other Org".into(),
            plan: Plan::Starter,
        })
        .await
        .unwrap();
    let outsider = create_user(&db, other_org.id, "Out Sider").await;

    let err = svc.send(&sender, note(outsider.user_id, "Hello?")).await.unwrap_err();
    assert!(matches!(err, DomariError::NotFound { .. }));
}

#[tokio::test]
async fn mark_read_only_touches_the_callers_inbox() {
    let (db, org_id) = setup().await;
    let svc = service(&db);
    let sender = create_user(&db, org_id, "Sam Sender").await;
    let recipient = create_user(&db, org_id, "Rae Recipient").await;

    let message = svc
        .send(&sender, note(recipient.user_id, "Inspection"))
        .await
        .unwrap();

    // The sender cannot mark the recipient's copy read.
    let touched = svc.mark_read(&sender, vec![message.id]).await.unwrap();
    assert_eq!(touched, 0);

    let touched = svc.mark_read(&recipient, vec![message.id]).await.unwrap();
    assert_eq!(touched, 1);

    // Idempotent on a second call.
    let touched = svc.mark_read(&recipient, vec![message.id]).await.unwrap();
    assert_eq!(touched, 1);
}
