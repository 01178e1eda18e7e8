//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints. Monetary amounts are stored as canonical
//! decimal strings and parsed back at the row-mapping boundary.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations (tenancy and billing boundary)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD subdomain ON TABLE organization TYPE string;
DEFINE FIELD plan ON TABLE organization TYPE string \
    ASSERT $value IN ['Starter', 'Professional', 'Enterprise'];
DEFINE FIELD plan_status ON TABLE organization TYPE string \
    ASSERT $value IN ['Trialing', 'Active', 'PastDue', 'Canceled', \
    'Unpaid'];
DEFINE FIELD billing_customer_ref ON TABLE organization \
    TYPE option<string>;
DEFINE FIELD billing_subscription_ref ON TABLE organization \
    TYPE option<string>;
DEFINE FIELD trial_ends_at ON TABLE organization TYPE option<datetime>;
DEFINE FIELD current_period_ends_at ON TABLE organization \
    TYPE option<datetime>;
DEFINE FIELD cancel_at_period_end ON TABLE organization TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_subdomain ON TABLE organization \
    COLUMNS subdomain UNIQUE;

-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD auth_ref ON TABLE user TYPE string;
DEFINE FIELD organization_id ON TABLE user TYPE option<string>;
DEFINE FIELD full_name ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['SuperAdmin', 'OrgAdmin', 'PropertyManager', \
    'Maintenance', 'Accountant', 'Viewer'];
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_auth_ref ON TABLE user COLUMNS auth_ref UNIQUE;
DEFINE INDEX idx_user_org ON TABLE user COLUMNS organization_id;

-- =======================================================================
-- Sessions
-- =======================================================================
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON TABLE session TYPE string;
DEFINE FIELD token_hash ON TABLE session TYPE string;
DEFINE FIELD expires_at ON TABLE session TYPE datetime;
DEFINE FIELD created_at ON TABLE session TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_session_token_hash ON TABLE session \
    COLUMNS token_hash UNIQUE;

-- =======================================================================
-- Properties
-- =======================================================================
DEFINE TABLE property SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE property TYPE string;
DEFINE FIELD name ON TABLE property TYPE string;
DEFINE FIELD address_line1 ON TABLE property TYPE string;
DEFINE FIELD city ON TABLE property TYPE string;
DEFINE FIELD state ON TABLE property TYPE string;
DEFINE FIELD postal_code ON TABLE property TYPE string;
DEFINE FIELD property_type ON TABLE property TYPE string \
    ASSERT $value IN ['SingleFamily', 'MultiFamily', 'Apartment', \
    'Condo', 'Commercial'];
DEFINE FIELD status ON TABLE property TYPE string \
    ASSERT $value IN ['Available', 'Occupied', 'Maintenance', \
    'Renovation', 'OffMarket'];
DEFINE FIELD bedrooms ON TABLE property TYPE int;
DEFINE FIELD bathrooms ON TABLE property TYPE float;
DEFINE FIELD square_feet ON TABLE property TYPE option<int>;
DEFINE FIELD year_built ON TABLE property TYPE option<int>;
DEFINE FIELD monthly_rent ON TABLE property TYPE string;
DEFINE FIELD purchase_price ON TABLE property TYPE option<string>;
DEFINE FIELD amenities ON TABLE property TYPE array<string> DEFAULT [];
DEFINE FIELD created_by ON TABLE property TYPE string;
DEFINE FIELD created_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE property TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_property_org ON TABLE property COLUMNS organization_id;

-- =======================================================================
-- Occupants (property residents)
-- =======================================================================
DEFINE TABLE occupant SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE occupant TYPE string;
DEFINE FIELD property_id ON TABLE occupant TYPE string;
DEFINE FIELD full_name ON TABLE occupant TYPE string;
DEFINE FIELD email ON TABLE occupant TYPE string;
DEFINE FIELD phone ON TABLE occupant TYPE option<string>;
DEFINE FIELD lease_start ON TABLE occupant TYPE datetime;
DEFINE FIELD lease_end ON TABLE occupant TYPE datetime;
DEFINE FIELD monthly_rent ON TABLE occupant TYPE string;
DEFINE FIELD security_deposit ON TABLE occupant TYPE string;
DEFINE FIELD status ON TABLE occupant TYPE string \
    ASSERT $value IN ['Active', 'Inactive', 'Eviction', 'Pending'];
DEFINE FIELD emergency_contact ON TABLE occupant \
    TYPE option<object> FLEXIBLE;
DEFINE FIELD created_at ON TABLE occupant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE occupant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_occupant_org ON TABLE occupant COLUMNS organization_id;
DEFINE INDEX idx_occupant_property ON TABLE occupant COLUMNS property_id;

-- =======================================================================
-- Service providers
-- =======================================================================
DEFINE TABLE service_provider SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE service_provider TYPE string;
DEFINE FIELD name ON TABLE service_provider TYPE string;
DEFINE FIELD email ON TABLE service_provider TYPE option<string>;
DEFINE FIELD phone ON TABLE service_provider TYPE option<string>;
DEFINE FIELD specialties ON TABLE service_provider TYPE array<string> \
    DEFAULT [];
DEFINE FIELD availability_status ON TABLE service_provider TYPE string \
    ASSERT $value IN ['Available', 'Busy', 'Unavailable'];
DEFINE FIELD hourly_rate ON TABLE service_provider TYPE option<string>;
DEFINE FIELD is_verified ON TABLE service_provider TYPE bool \
    DEFAULT false;
DEFINE FIELD created_at ON TABLE service_provider TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE service_provider TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_provider_org ON TABLE service_provider \
    COLUMNS organization_id;

-- =======================================================================
-- Work orders
-- =======================================================================
DEFINE TABLE work_order SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE work_order TYPE string;
DEFINE FIELD property_id ON TABLE work_order TYPE string;
DEFINE FIELD occupant_id ON TABLE work_order TYPE option<string>;
DEFINE FIELD title ON TABLE work_order TYPE string;
DEFINE FIELD description ON TABLE work_order TYPE string;
DEFINE FIELD category ON TABLE work_order TYPE string \
    ASSERT $value IN ['Plumbing', 'Electrical', 'Hvac', 'Appliance', \
    'Structural', 'Landscaping', 'General'];
DEFINE FIELD priority ON TABLE work_order TYPE string \
    ASSERT $value IN ['Critical', 'High', 'Medium', 'Low'];
DEFINE FIELD priority_rank ON TABLE work_order TYPE int;
DEFINE FIELD status ON TABLE work_order TYPE string \
    ASSERT $value IN ['Open', 'Assigned', 'InProgress', 'PendingParts', \
    'Completed', 'Closed', 'Cancelled'];
DEFINE FIELD estimated_cost ON TABLE work_order TYPE option<string>;
DEFINE FIELD actual_cost ON TABLE work_order TYPE option<string>;
DEFINE FIELD assigned_to_kind ON TABLE work_order TYPE option<string>;
DEFINE FIELD assigned_to_id ON TABLE work_order TYPE option<string>;
DEFINE FIELD due_at ON TABLE work_order TYPE option<datetime>;
DEFINE FIELD completed_at ON TABLE work_order TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE work_order TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE work_order TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_work_order_org ON TABLE work_order \
    COLUMNS organization_id;
DEFINE INDEX idx_work_order_property ON TABLE work_order \
    COLUMNS property_id;

-- =======================================================================
-- Work order updates (user-facing status history)
-- =======================================================================
DEFINE TABLE work_order_update SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE work_order_update TYPE string;
DEFINE FIELD work_order_id ON TABLE work_order_update TYPE string;
DEFINE FIELD author_id ON TABLE work_order_update TYPE string;
DEFINE FIELD from_status ON TABLE work_order_update TYPE string;
DEFINE FIELD to_status ON TABLE work_order_update TYPE string;
DEFINE FIELD message ON TABLE work_order_update TYPE string;
DEFINE FIELD image_refs ON TABLE work_order_update TYPE array<string> \
    DEFAULT [];
DEFINE FIELD created_at ON TABLE work_order_update TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_wo_update_wo ON TABLE work_order_update \
    COLUMNS work_order_id;

-- =======================================================================
-- Invoices
-- =======================================================================
DEFINE TABLE invoice SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE invoice TYPE string;
DEFINE FIELD invoice_number ON TABLE invoice TYPE string;
DEFINE FIELD invoice_type ON TABLE invoice TYPE string \
    ASSERT $value IN ['Rent', 'Maintenance', 'Deposit', 'Utility', \
    'Other'];
DEFINE FIELD property_id ON TABLE invoice TYPE string;
DEFINE FIELD occupant_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD work_order_id ON TABLE invoice TYPE option<string>;
DEFINE FIELD status ON TABLE invoice TYPE string \
    ASSERT $value IN ['Draft', 'Open', 'PartiallyPaid', 'Paid', 'Void'];
DEFINE FIELD issue_date ON TABLE invoice TYPE datetime;
DEFINE FIELD due_date ON TABLE invoice TYPE datetime;
DEFINE FIELD line_items ON TABLE invoice TYPE array<object> FLEXIBLE;
DEFINE FIELD tax_rate ON TABLE invoice TYPE string;
DEFINE FIELD discount_amount ON TABLE invoice TYPE string;
DEFINE FIELD total_amount ON TABLE invoice TYPE string;
DEFINE FIELD paid_amount ON TABLE invoice TYPE string;
DEFINE FIELD balance ON TABLE invoice TYPE string;
DEFINE FIELD payment_link ON TABLE invoice TYPE option<string>;
DEFINE FIELD created_at ON TABLE invoice TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE invoice TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_invoice_org ON TABLE invoice COLUMNS organization_id;
DEFINE INDEX idx_invoice_number ON TABLE invoice \
    COLUMNS organization_id, invoice_number UNIQUE;

-- =======================================================================
-- Messages
-- =======================================================================
DEFINE TABLE message SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE message TYPE string;
DEFINE FIELD sender_id ON TABLE message TYPE string;
DEFINE FIELD recipient_id ON TABLE message TYPE string;
DEFINE FIELD subject ON TABLE message TYPE string;
DEFINE FIELD body ON TABLE message TYPE string;
DEFINE FIELD thread_id ON TABLE message TYPE option<string>;
DEFINE FIELD is_read ON TABLE message TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE message TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_message_recipient ON TABLE message \
    COLUMNS organization_id, recipient_id;

-- =======================================================================
-- Notifications
-- =======================================================================
DEFINE TABLE notification SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE notification TYPE string;
DEFINE FIELD user_id ON TABLE notification TYPE string;
DEFINE FIELD kind ON TABLE notification TYPE string \
    ASSERT $value IN ['MessageReceived', 'WorkOrderAssigned', \
    'InvoiceOverdue', 'PaymentRecorded'];
DEFINE FIELD payload ON TABLE notification TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD is_read ON TABLE notification TYPE bool DEFAULT false;
DEFINE FIELD created_at ON TABLE notification TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_notification_user ON TABLE notification \
    COLUMNS organization_id, user_id;

-- =======================================================================
-- Audit log (append-only)
-- =======================================================================
DEFINE TABLE audit_log SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE audit_log TYPE string;
DEFINE FIELD user_id ON TABLE audit_log TYPE string;
DEFINE FIELD action ON TABLE audit_log TYPE string \
    ASSERT $value IN ['Create', 'Update', 'StatusChange', \
    'PaymentRecorded', 'PaymentLinkIssued'];
DEFINE FIELD entity_type ON TABLE audit_log TYPE string;
DEFINE FIELD entity_id ON TABLE audit_log TYPE string;
DEFINE FIELD changes ON TABLE audit_log TYPE object FLEXIBLE \
    DEFAULT {};
DEFINE FIELD created_at ON TABLE audit_log TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_audit_org ON TABLE audit_log COLUMNS organization_id;
";

/// Apply any pending schema migrations.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_defines_every_tenant_table() {
        for table in [
            "organization",
            "user",
            "session",
            "property",
            "occupant",
            "service_provider",
            "work_order",
            "work_order_update",
            "invoice",
            "message",
            "notification",
            "audit_log",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
