//! SQLite schema for the record store
//!
//! The `passwords` table layout is fixed so that databases written by
//! earlier versions of the tool open unchanged. Every column except `id`
//! is nullable TEXT; readers treat NULL as an empty string.

use rusqlite::{Connection, Result};

use crate::models::Field;
use crate::storage::error::{StorageError, StorageResult};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Name of the record table
pub const RECORDS_TABLE: &str = "passwords";

/// Initialize the database schema
///
/// Every statement is `IF NOT EXISTS` or an upsert, so this is safe to run
/// against a database that already holds records.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Schema version tracking
        CREATE TABLE IF NOT EXISTS schema_info (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        -- Credential records
        CREATE TABLE IF NOT EXISTS passwords (
            id TEXT PRIMARY KEY,
            name TEXT,
            login TEXT,
            password TEXT,
            description TEXT,
            url TEXT
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO schema_info (key, value) VALUES ('version', ?)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> Result<Option<i32>> {
    if !table_exists(conn, "schema_info")? {
        return Ok(None);
    }

    let mut stmt = conn.prepare("SELECT value FROM schema_info WHERE key = 'version'")?;
    let result: Result<String> = stmt.query_row([], |row| row.get(0));

    match result {
        Ok(version_str) => Ok(version_str.parse().ok()),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Check if schema needs initialization or migration
pub fn needs_init(conn: &Connection) -> bool {
    match table_exists(conn, RECORDS_TABLE) {
        Ok(true) => {}
        _ => return true,
    }

    match get_schema_version(conn) {
        Ok(Some(v)) => v < SCHEMA_VERSION,
        _ => true,
    }
}

/// Check that the record table has every expected column
pub fn verify_schema(conn: &Connection) -> StorageResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1)")?;
    let columns: Vec<String> = stmt
        .query_map([RECORDS_TABLE], |row| row.get(0))?
        .collect::<Result<_>>()?;

    let missing: Vec<String> = std::iter::once("id")
        .chain(Field::ALL.iter().map(|f| f.column()))
        .filter(|expected| !columns.iter().any(|c| c.eq_ignore_ascii_case(expected)))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StorageError::SchemaMismatch {
            table: RECORDS_TABLE,
            missing,
        })
    }
}

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    conn.prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?")?
        .exists([name])
}
