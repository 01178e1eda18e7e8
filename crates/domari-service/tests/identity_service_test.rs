//! Integration tests for identity resolution: session issuance,
//! expiry, logout, and account gating.

use chrono::Duration;
use domari_core::context::Role;
use domari_core::error::DomariError;
use domari_core::models::organization::{CreateOrganization, Plan};
use domari_core::models::session::{CreateSession, Session};
use domari_core::models::user::{CreateUser, UpdateUser};
use domari_core::repository::{OrganizationRepository, SessionRepository, UserRepository};
use domari_db::repository::{
    SurrealOrganizationRepository, SurrealSessionRepository, SurrealUserRepository,
};
use domari_service::identity::IdentityService;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use uuid::Uuid;

async fn setup() -> (Surreal<Db>, Uuid, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    domari_db::run_migrations(&db).await.unwrap();

    let org = SurrealOrganizationRepository::new(db.clone())
        .create(CreateOrganization {
            name: "Identity Org".into(),
            plan: Plan::Professional,
        })
        .await
        .unwrap();

    let user = SurrealUserRepository::new(db.clone())
        .create(CreateUser {
            auth_ref: "auth0|abc123".into(),
            organization_id: org.id,
            full_name: "Riley Resolver".into(),
            email: "riley@example.com".into(),
            role: Role::PropertyManager,
        })
        .await
        .unwrap();

    (db, org.id, user.id)
}

fn service(
    db: &Surreal<Db>,
) -> IdentityService<
    SurrealSessionRepository<surrealdb::engine::local::Db>,
    SurrealUserRepository<surrealdb::engine::local::Db>,
> {
    IdentityService::new(
        SurrealSessionRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
    )
}

#[tokio::test]
async fn issued_token_resolves_to_the_stored_profile() {
    let (db, org_id, user_id) = setup().await;
    let svc = service(&db);

    let issued = svc.issue_session(user_id, Duration::hours(8)).await.unwrap();
    let ctx = svc.resolve(&issued.raw_token).await.unwrap();

    assert_eq!(ctx.user_id, user_id);
    assert_eq!(ctx.organization_id, org_id);
    assert_eq!(ctx.role, Role::PropertyManager);
    assert_eq!(ctx.email, "riley@example.com");
}

#[tokio::test]
async fn unknown_token_is_an_authentication_failure() {
    let (db, _, _) = setup().await;
    let svc = service(&db);

    let err = svc.resolve("not-a-real-token").await.unwrap_err();
    assert!(matches!(err, DomariError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn expired_session_is_rejected_and_invalidated() {
    let (db, _, user_id) = setup().await;
    let svc = service(&db);

    let issued = svc.issue_session(user_id, Duration::seconds(-5)).await.unwrap();

    let err = svc.resolve(&issued.raw_token).await.unwrap_err();
    assert!(matches!(err, DomariError::AuthenticationFailed { .. }));

    // The expired session was removed on first contact.
    let err = svc.resolve(&issued.raw_token).await.unwrap_err();
    assert!(matches!(err, DomariError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let (db, _, user_id) = setup().await;
    let svc = service(&db);

    let issued = svc.issue_session(user_id, Duration::hours(8)).await.unwrap();
    assert!(svc.resolve(&issued.raw_token).await.is_ok());

    svc.logout(issued.session_id).await.unwrap();
    let err = svc.resolve(&issued.raw_token).await.unwrap_err();
    assert!(matches!(err, DomariError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn deactivated_accounts_cannot_resolve() {
    let (db, org_id, user_id) = setup().await;
    let svc = service(&db);
    let issued = svc.issue_session(user_id, Duration::hours(8)).await.unwrap();

    SurrealUserRepository::new(db.clone())
        .update(
            org_id,
            user_id,
            UpdateUser {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = svc.resolve(&issued.raw_token).await.unwrap_err();
    assert!(matches!(err, DomariError::AuthenticationFailed { .. }));
}

#[tokio::test]
async fn tokens_are_single_use_strings_not_guessable_ids() {
    let (db, _, user_id) = setup().await;
    let svc = service(&db);

    let a = svc.issue_session(user_id, Duration::hours(1)).await.unwrap();
    let b = svc.issue_session(user_id, Duration::hours(1)).await.unwrap();
    assert_ne!(a.raw_token, b.raw_token);
    assert_ne!(a.raw_token, user_id.to_string());
    assert_eq!(a.raw_token.len(), 43);
}

/// Session store whose deletes always fail.
struct FlakySessionStore {
    inner: SurrealSessionRepository<surrealdb::engine::local::Db>,
}

impl SessionRepository for FlakySessionStore {
    async fn create(&self, input: CreateSession) -> domari_core::error::DomariResult<Session> {
        self.inner.create(input).await
    }

    async fn get_by_token_hash(
        &self,
        token_hash: &str,
    ) -> domari_core::error::DomariResult<Session> {
        self.inner.get_by_token_hash(token_hash).await
    }

    async fn invalidate(&self, _id: Uuid) -> domari_core::error::DomariResult<()> {
        Err(DomariError::Database("session store unavailable".into()))
    }
}

#[tokio::test]
async fn expiry_is_reported_even_when_the_purge_fails() {
    let (db, _, user_id) = setup().await;
    let svc = IdentityService::new(
        FlakySessionStore {
            inner: SurrealSessionRepository::new(db.clone()),
        },
        SurrealUserRepository::new(db.clone()),
    );

    let issued = svc.issue_session(user_id, Duration::seconds(-5)).await.unwrap();

    // The failed cleanup is logged, not surfaced; the caller still
    // sees an authentication failure, not a store error.
    let err = svc.resolve(&issued.raw_token).await.unwrap_err();
    assert!(matches!(err, DomariError::AuthenticationFailed { .. }));
}
