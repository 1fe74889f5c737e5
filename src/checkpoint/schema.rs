/*!
 * Checkpoint database schema.
 */

use log::{debug, info};
use rusqlite::Connection;

use crate::errors::CheckpointError;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the checkpoint schema on a fresh or existing database
pub fn initialize_schema(conn: &Connection) -> Result<(), CheckpointError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing checkpoint schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(CheckpointError::Corrupt(format!(
            "checkpoint schema v{} is newer than supported v{}",
            current_version, SCHEMA_VERSION
        )));
    } else {
        debug!("Checkpoint schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32, CheckpointError> {
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), CheckpointError> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all checkpoint tables
fn create_all_tables(conn: &Connection) -> Result<(), CheckpointError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS entries (
            position INTEGER PRIMARY KEY,
            original TEXT NOT NULL UNIQUE,
            translation TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS checkpoint_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            run_id TEXT NOT NULL,
            saved_at TEXT NOT NULL,
            entry_count INTEGER NOT NULL,
            digest TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}
