//! Schema definition and destructive reset.
//!
//! # Responsibility
//! - Own the `personal_details` / `communication_addresses` DDL.
//! - Drop and recreate both tables in one transaction.
//! - Provide introspection helpers used by repository readiness checks.
//!
//! # Invariants
//! - `communication_addresses.person_id` references `personal_details.id`
//!   with `ON DELETE CASCADE`.
//! - Reset is all-or-nothing: either both tables are recreated or the
//!   previous schema is left untouched.
//! - There is no version tracking; every reset yields the same empty schema.

use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, TransactionBehavior};

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Person table name.
pub const PERSON_TABLE: &str = "personal_details";
/// Communication address table name.
pub const ADDRESS_TABLE: &str = "communication_addresses";

/// Columns every repository expects on `personal_details`.
pub const PERSON_COLUMNS: &[&str] = &[
    "id",
    "name",
    "email",
    "phone",
    "age",
    "permanent_address",
    "password",
    "created_at",
    "updated_at",
];

/// Columns every repository expects on `communication_addresses`.
pub const ADDRESS_COLUMNS: &[&str] = &[
    "id",
    "person_id",
    "communication_address",
    "created_at",
    "updated_at",
];

/// Drops both tables and recreates them empty.
///
/// Child table is dropped first so the foreign key never dangles.
pub fn reset_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    if let Err(err) = tx.execute_batch(SCHEMA_SQL) {
        error!("event=schema_reset module=db status=error error={err}");
        return Err(err.into());
    }
    tx.commit()?;

    info!(
        "event=schema_reset module=db status=ok tables={},{}",
        PERSON_TABLE, ADDRESS_TABLE
    );
    Ok(())
}

/// Returns whether `table` exists in the main schema.
pub fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns whether `table` declares `column`.
pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> DbResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
