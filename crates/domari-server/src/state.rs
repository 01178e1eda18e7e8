//! Shared application state and request-scoped service construction.
//!
//! Repository handles are cheap clones over one SurrealDB connection,
//! so every handler builds its services fresh; the store is the only
//! serialization point.

use domari_db::DbManager;
use domari_db::repository::{
    SurrealAuditLogRepository, SurrealInvoiceRepository, SurrealMessageRepository,
    SurrealNotificationRepository, SurrealOccupantRepository, SurrealOrganizationRepository,
    SurrealPropertyRepository, SurrealServiceProviderRepository, SurrealSessionRepository,
    SurrealUserRepository, SurrealWorkOrderRepository,
};
use domari_service::export::ExportService;
use domari_service::identity::IdentityService;
use domari_service::invoices::InvoiceService;
use domari_service::messaging::{MessagingService, NotificationService};
use domari_service::occupants::OccupantService;
use domari_service::plan::PlanGate;
use domari_service::properties::PropertyService;
use domari_service::providers::ProviderService;
use domari_service::sink::{AuditSink, NotificationSink};
use domari_service::work_orders::WorkOrderService;
use surrealdb::engine::remote::ws::Client;

use crate::gateway::HttpPaymentGateway;

type OrgRepo = SurrealOrganizationRepository<Client>;
type UserRepo = SurrealUserRepository<Client>;
type SessionRepo = SurrealSessionRepository<Client>;
type PropertyRepo = SurrealPropertyRepository<Client>;
type OccupantRepo = SurrealOccupantRepository<Client>;
type ProviderRepo = SurrealServiceProviderRepository<Client>;
type InvoiceRepo = SurrealInvoiceRepository<Client>;
type WorkOrderRepo = SurrealWorkOrderRepository<Client>;
type MessageRepo = SurrealMessageRepository<Client>;
type NotificationRepo = SurrealNotificationRepository<Client>;
type AuditRepo = SurrealAuditLogRepository<Client>;

#[derive(Clone)]
pub struct AppState {
    db: DbManager,
    gateway: HttpPaymentGateway,
}

impl AppState {
    pub fn new(db: DbManager, gateway: HttpPaymentGateway) -> Self {
        Self { db, gateway }
    }

    pub fn db(&self) -> &DbManager {
        &self.db
    }

    pub fn organizations(&self) -> OrgRepo {
        SurrealOrganizationRepository::new(self.db.client())
    }

    pub fn users(&self) -> UserRepo {
        SurrealUserRepository::new(self.db.client())
    }

    pub fn audit_log(&self) -> AuditRepo {
        SurrealAuditLogRepository::new(self.db.client())
    }

    fn audit_sink(&self) -> AuditSink<AuditRepo> {
        AuditSink::new(self.audit_log())
    }

    fn notification_sink(&self) -> NotificationSink<NotificationRepo> {
        NotificationSink::new(SurrealNotificationRepository::new(self.db.client()))
    }

    pub fn identity(&self) -> IdentityService<SessionRepo, UserRepo> {
        IdentityService::new(SurrealSessionRepository::new(self.db.client()), self.users())
    }

    pub fn plan_gate(&self) -> PlanGate<OrgRepo, PropertyRepo, UserRepo> {
        PlanGate::new(
            self.organizations(),
            SurrealPropertyRepository::new(self.db.client()),
            self.users(),
        )
    }

    pub fn properties(&self) -> PropertyService<PropertyRepo, OrgRepo, UserRepo, AuditRepo> {
        PropertyService::new(
            SurrealPropertyRepository::new(self.db.client()),
            self.plan_gate(),
            self.audit_sink(),
        )
    }

    pub fn occupants(&self) -> OccupantService<OccupantRepo, PropertyRepo, AuditRepo> {
        OccupantService::new(
            SurrealOccupantRepository::new(self.db.client()),
            SurrealPropertyRepository::new(self.db.client()),
            self.audit_sink(),
        )
    }

    pub fn providers(&self) -> ProviderService<ProviderRepo, AuditRepo> {
        ProviderService::new(
            SurrealServiceProviderRepository::new(self.db.client()),
            self.audit_sink(),
        )
    }

    pub fn invoices(
        &self,
    ) -> InvoiceService<InvoiceRepo, OccupantRepo, HttpPaymentGateway, AuditRepo, NotificationRepo>
    {
        InvoiceService::new(
            SurrealInvoiceRepository::new(self.db.client()),
            SurrealOccupantRepository::new(self.db.client()),
            self.gateway.clone(),
            self.audit_sink(),
            self.notification_sink(),
        )
    }

    pub fn work_orders(&self) -> WorkOrderService<WorkOrderRepo, AuditRepo, NotificationRepo> {
        WorkOrderService::new(
            SurrealWorkOrderRepository::new(self.db.client()),
            self.audit_sink(),
            self.notification_sink(),
        )
    }

    pub fn messaging(&self) -> MessagingService<MessageRepo, UserRepo, NotificationRepo> {
        MessagingService::new(
            SurrealMessageRepository::new(self.db.client()),
            self.users(),
            self.notification_sink(),
        )
    }

    pub fn notifications(&self) -> NotificationService<NotificationRepo> {
        NotificationService::new(SurrealNotificationRepository::new(self.db.client()))
    }

    pub fn export(
        &self,
    ) -> ExportService<InvoiceRepo, PropertyRepo, OccupantRepo, WorkOrderRepo, UserRepo, ProviderRepo>
    {
        ExportService::new(
            SurrealInvoiceRepository::new(self.db.client()),
            SurrealPropertyRepository::new(self.db.client()),
            SurrealOccupantRepository::new(self.db.client()),
            SurrealWorkOrderRepository::new(self.db.client()),
            self.users(),
            SurrealServiceProviderRepository::new(self.db.client()),
        )
    }

    pub fn payment_gateway(&self) -> HttpPaymentGateway {
        self.gateway.clone()
    }
}
