//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

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
// Schema v1: initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts (identity provider)
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD name ON TABLE account TYPE string;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD password_hash ON TABLE account TYPE string;
DEFINE FIELD role ON TABLE account TYPE string \
    ASSERT $value IN ['Tenant', 'Caretaker', 'Admin'];
DEFINE FIELD is_active ON TABLE account TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_email ON TABLE account COLUMNS email UNIQUE;

-- =======================================================================
-- Caretakers
-- =======================================================================
DEFINE TABLE caretaker SCHEMAFULL;
DEFINE FIELD user_id ON TABLE caretaker TYPE string;
DEFINE FIELD phone ON TABLE caretaker TYPE string;
DEFINE FIELD assigned_area ON TABLE caretaker TYPE string;
DEFINE FIELD created_at ON TABLE caretaker TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE caretaker TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_caretaker_user ON TABLE caretaker COLUMNS user_id UNIQUE;

-- =======================================================================
-- Units
-- =======================================================================
DEFINE TABLE unit SCHEMAFULL;
DEFINE FIELD building ON TABLE unit TYPE string;
DEFINE FIELD unit_number ON TABLE unit TYPE string;
DEFINE FIELD description ON TABLE unit TYPE string;
DEFINE FIELD rent_amount ON TABLE unit TYPE number;
DEFINE FIELD status ON TABLE unit TYPE string \
    ASSERT $value IN ['Available', 'Occupied'];
DEFINE FIELD created_at ON TABLE unit TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE unit TYPE datetime \
    DEFAULT time::now();
-- A unit number is unique within its building.
DEFINE INDEX idx_unit_building_number ON TABLE unit \
    COLUMNS building, unit_number UNIQUE;
DEFINE INDEX idx_unit_status ON TABLE unit COLUMNS status;

-- =======================================================================
-- Tenants
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD user_id ON TABLE tenant TYPE string;
DEFINE FIELD phone ON TABLE tenant TYPE string;
DEFINE FIELD national_id ON TABLE tenant TYPE string;
DEFINE FIELD emergency_contact ON TABLE tenant TYPE string;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_user ON TABLE tenant COLUMNS user_id UNIQUE;

-- =======================================================================
-- Leases (append-only history; rows are never deleted)
-- =======================================================================
DEFINE TABLE lease SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE lease TYPE string;
DEFINE FIELD unit_id ON TABLE lease TYPE string;
DEFINE FIELD start_date ON TABLE lease TYPE datetime;
DEFINE FIELD end_date ON TABLE lease TYPE option<datetime>;
DEFINE FIELD deposit_amount ON TABLE lease TYPE number;
DEFINE FIELD deposit_paid ON TABLE lease TYPE bool DEFAULT false;
DEFINE FIELD status ON TABLE lease TYPE string \
    ASSERT $value IN ['Active', 'Terminated'];
DEFINE FIELD created_at ON TABLE lease TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_lease_unit_status ON TABLE lease COLUMNS unit_id, status;
DEFINE INDEX idx_lease_tenant_status ON TABLE lease \
    COLUMNS tenant_id, status;
";

/// Apply any pending migrations.
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
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn schema_v1_defines_every_table() {
        for table in ["account", "caretaker", "unit", "tenant", "lease"] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} ")),
                "missing table definition for {table}"
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
