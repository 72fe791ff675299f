//! Database schema migrations.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const CURRENT_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Current schema version, 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> SqliteResult<i32> {
    match conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    }) {
        Ok(v) => Ok(v),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: people, chores and the completion log.
///
/// - `chores.frequency` holds the policy record as JSON text
/// - `chores.assignees` holds a JSON array of person ids
/// - timestamps are fixed-width RFC 3339 UTC text, so they sort as text
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS people (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            color       TEXT NOT NULL,
            avatar      TEXT,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chores (
            id                TEXT PRIMARY KEY,
            name              TEXT NOT NULL,
            description       TEXT,
            room              TEXT NOT NULL DEFAULT 'General',
            frequency         TEXT NOT NULL,
            assignees         TEXT NOT NULL DEFAULT '[]',
            rotation          TEXT NOT NULL DEFAULT 'fixed',
            rotation_index    INTEGER NOT NULL DEFAULT 0,
            priority          TEXT NOT NULL DEFAULT 'medium',
            estimated_minutes INTEGER,
            next_due          TEXT NOT NULL,
            created_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chore_completions (
            id            TEXT PRIMARY KEY,
            chore_id      TEXT NOT NULL REFERENCES chores(id) ON DELETE CASCADE,
            completed_by  TEXT NOT NULL,
            completed_at  TEXT NOT NULL,
            notes         TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_chores_next_due ON chores(next_due);
        CREATE INDEX IF NOT EXISTS idx_completions_completed_at ON chore_completions(completed_at);
        CREATE INDEX IF NOT EXISTS idx_completions_chore_id ON chore_completions(chore_id);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}
