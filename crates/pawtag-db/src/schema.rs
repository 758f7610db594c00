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
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tags (physical NFC/QR tags)
-- =======================================================================
DEFINE TABLE tag SCHEMAFULL;
DEFINE FIELD code ON TABLE tag TYPE string;
DEFINE FIELD status ON TABLE tag TYPE string \
    ASSERT $value IN ['Unassigned', 'Active', 'Inactive'];
DEFINE FIELD owner_id ON TABLE tag TYPE option<string>;
DEFINE FIELD pet_id ON TABLE tag TYPE option<string>;
DEFINE FIELD notes ON TABLE tag TYPE option<string>;
DEFINE FIELD created_at ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD activated_at ON TABLE tag TYPE option<datetime>;
DEFINE FIELD last_updated ON TABLE tag TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tag_code ON TABLE tag COLUMNS code UNIQUE;

-- =======================================================================
-- Pets (resolver-facing slice of the pet profile)
-- =======================================================================
DEFINE TABLE pet SCHEMAFULL;
DEFINE FIELD owner_id ON TABLE pet TYPE string;
DEFINE FIELD name ON TABLE pet TYPE string;
DEFINE FIELD species ON TABLE pet TYPE option<string>;
DEFINE FIELD photo_url ON TABLE pet TYPE option<string>;
DEFINE FIELD created_at ON TABLE pet TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE pet TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_pet_owner ON TABLE pet COLUMNS owner_id;

-- =======================================================================
-- Scan events (write-once rows, location patched at most once)
-- =======================================================================
DEFINE TABLE scan_event SCHEMAFULL;
DEFINE FIELD tag_id ON TABLE scan_event TYPE string;
DEFINE FIELD pet_id ON TABLE scan_event TYPE option<string>;
DEFINE FIELD user_id ON TABLE scan_event TYPE option<string>;
DEFINE FIELD device_info ON TABLE scan_event TYPE object FLEXIBLE;
DEFINE FIELD location ON TABLE scan_event TYPE option<object> FLEXIBLE;
DEFINE FIELD created_at ON TABLE scan_event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_scan_event_tag ON TABLE scan_event COLUMNS tag_id;
";

/// Runs all pending migrations against the given database handle.
///
/// Safe to call on every startup; applied versions are tracked in the
/// `_migration` table and skipped on subsequent runs.
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

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
