//! SQLite-backed household storage.
//!
//! Provides persistent storage for:
//! - People (household members)
//! - Chores with their recurrence policy and rotation state
//! - The append-only chore completion log

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use super::migrations;
use super::repository::{ChoreRepository, CompletionLog, PersonRepository};
use super::data_dir;
use crate::chore::{self, Chore, ChoreCompletion, CompletionOutcome, Person};
use crate::error::{CoreError, DatabaseError, Result};
use crate::recurrence::RecurrencePolicy;

const CHORE_COLUMNS: &str = "id, name, description, room, frequency, assignees, rotation,
     rotation_index, priority, estimated_minutes, next_due, created_at";

const COMPLETION_COLUMNS: &str = "id, chore_id, completed_by, completed_at, notes";

// === Helper Functions ===

/// Fixed-width UTC timestamp, so text order matches time order.
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

fn parse_enum<T>(idx: usize, text: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_person(row: &Row) -> rusqlite::Result<Person> {
    let created_at: String = row.get(4)?;
    Ok(Person {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        avatar: row.get(3)?,
        created_at: parse_timestamp(4, &created_at)?,
    })
}

fn row_to_completion(row: &Row) -> rusqlite::Result<ChoreCompletion> {
    let completed_at: String = row.get(3)?;
    Ok(ChoreCompletion {
        id: row.get(0)?,
        chore_id: row.get(1)?,
        completed_by: row.get(2)?,
        completed_at: parse_timestamp(3, &completed_at)?,
        notes: row.get(4)?,
    })
}

/// A chore row before its policy text has been validated.
struct ChoreRow {
    chore: Chore,
    frequency: String,
}

fn row_to_chore_row(row: &Row) -> rusqlite::Result<ChoreRow> {
    let assignees_json: String = row.get(5)?;
    let assignees: Vec<String> = serde_json::from_str(&assignees_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let rotation: String = row.get(6)?;
    let priority: String = row.get(8)?;
    let next_due: String = row.get(10)?;
    let created_at: String = row.get(11)?;

    Ok(ChoreRow {
        chore: Chore {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            room: row.get(3)?,
            // Replaced once the stored text has been parsed.
            frequency: RecurrencePolicy::Daily,
            assignees,
            rotation: parse_enum(6, &rotation)?,
            rotation_index: row.get(7)?,
            priority: parse_enum(8, &priority)?,
            estimated_minutes: row.get(9)?,
            next_due: parse_timestamp(10, &next_due)?,
            created_at: parse_timestamp(11, &created_at)?,
        },
        frequency: row.get(4)?,
    })
}

impl TryFrom<ChoreRow> for Chore {
    type Error = CoreError;

    fn try_from(row: ChoreRow) -> Result<Self> {
        let ChoreRow { mut chore, frequency } = row;
        chore.frequency = frequency
            .parse::<RecurrencePolicy>()
            .map_err(|source| CoreError::InvalidRecord {
                kind: "chore",
                id: chore.id.clone(),
                source,
            })?;
        Ok(chore)
    }
}

/// SQLite database for household data.
pub struct HouseholdDb {
    conn: Connection,
}

impl HouseholdDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data dir>/household.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("household.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Complete a chore inside one transaction.
    ///
    /// See [`chore::complete_chore`].
    pub fn complete_chore<Tz: TimeZone>(
        &self,
        chore_id: &str,
        completed_by: &str,
        completed_at: &DateTime<Tz>,
        notes: Option<String>,
    ) -> Result<CompletionOutcome> {
        let tx = self.conn.unchecked_transaction()?;
        let outcome = chore::complete_chore(self, chore_id, completed_by, completed_at, notes)?;
        tx.commit()?;
        Ok(outcome)
    }

    fn query_chores<P: rusqlite::Params>(&self, where_clause: &str, params: P) -> Result<Vec<Chore>> {
        let sql = format!(
            "SELECT {CHORE_COLUMNS} FROM chores {where_clause} ORDER BY next_due ASC, name ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, row_to_chore_row)?;
        let mut chores = Vec::new();
        for row in rows {
            chores.push(Chore::try_from(row?)?);
        }
        Ok(chores)
    }

    /// `limit` follows SQLite: negative means no limit.
    fn query_completions<P: rusqlite::Params>(
        &self,
        where_clause: &str,
        limit: i64,
        params: P,
    ) -> Result<Vec<ChoreCompletion>> {
        let sql = format!(
            "SELECT {COMPLETION_COLUMNS} FROM chore_completions {where_clause}
             ORDER BY completed_at DESC, rowid DESC LIMIT {limit}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params, row_to_completion)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

fn not_found(kind: &'static str, id: &str) -> CoreError {
    CoreError::NotFound {
        kind,
        id: id.to_string(),
    }
}

impl PersonRepository for HouseholdDb {
    fn create_person(&self, person: &Person) -> Result<()> {
        self.conn.execute(
            "INSERT INTO people (id, name, color, avatar, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                person.id,
                person.name,
                person.color,
                person.avatar,
                format_timestamp(&person.created_at),
            ],
        )?;
        tracing::debug!(person_id = %person.id, "person created");
        Ok(())
    }

    fn get_person(&self, id: &str) -> Result<Option<Person>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, color, avatar, created_at FROM people WHERE id = ?1",
                params![id],
                row_to_person,
            )
            .optional()?)
    }

    fn list_people(&self) -> Result<Vec<Person>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, color, avatar, created_at FROM people
             ORDER BY created_at ASC, name ASC",
        )?;
        let rows = stmt.query_map([], row_to_person)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn update_person(&self, person: &Person) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE people SET name = ?2, color = ?3, avatar = ?4 WHERE id = ?1",
            params![person.id, person.name, person.color, person.avatar],
        )?;
        if changed == 0 {
            return Err(not_found("person", &person.id));
        }
        Ok(())
    }

    fn delete_person(&self, id: &str) -> Result<()> {
        let changed = self
            .conn
            .execute("DELETE FROM people WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(not_found("person", id));
        }
        tracing::debug!(person_id = %id, "person deleted");
        Ok(())
    }
}

impl ChoreRepository for HouseholdDb {
    fn create_chore(&self, chore: &Chore) -> Result<()> {
        self.conn.execute(
            "INSERT INTO chores (id, name, description, room, frequency, assignees, rotation,
                                 rotation_index, priority, estimated_minutes, next_due, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                chore.id,
                chore.name,
                chore.description,
                chore.room,
                chore.frequency.to_record_json(),
                serde_json::to_string(&chore.assignees)?,
                chore.rotation.as_str(),
                chore.rotation_index,
                chore.priority.as_str(),
                chore.estimated_minutes,
                format_timestamp(&chore.next_due),
                format_timestamp(&chore.created_at),
            ],
        )?;
        tracing::debug!(chore_id = %chore.id, next_due = %chore.next_due, "chore created");
        Ok(())
    }

    fn get_chore(&self, id: &str) -> Result<Option<Chore>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CHORE_COLUMNS} FROM chores WHERE id = ?1"),
                params![id],
                row_to_chore_row,
            )
            .optional()?;
        row.map(Chore::try_from).transpose()
    }

    fn list_chores(&self) -> Result<Vec<Chore>> {
        self.query_chores("", [])
    }

    fn update_chore(&self, chore: &Chore) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE chores SET name = ?2, description = ?3, room = ?4, frequency = ?5,
                 assignees = ?6, rotation = ?7, rotation_index = ?8, priority = ?9,
                 estimated_minutes = ?10, next_due = ?11
             WHERE id = ?1",
            params![
                chore.id,
                chore.name,
                chore.description,
                chore.room,
                chore.frequency.to_record_json(),
                serde_json::to_string(&chore.assignees)?,
                chore.rotation.as_str(),
                chore.rotation_index,
                chore.priority.as_str(),
                chore.estimated_minutes,
                format_timestamp(&chore.next_due),
            ],
        )?;
        if changed == 0 {
            return Err(not_found("chore", &chore.id));
        }
        tracing::debug!(chore_id = %chore.id, next_due = %chore.next_due, "chore updated");
        Ok(())
    }

    fn delete_chore(&self, id: &str) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM chore_completions WHERE chore_id = ?1",
            params![id],
        )?;
        let changed = tx.execute("DELETE FROM chores WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(not_found("chore", id));
        }
        tx.commit()?;
        tracing::debug!(chore_id = %id, "chore deleted");
        Ok(())
    }

    fn chores_due_before(&self, before: DateTime<Utc>) -> Result<Vec<Chore>> {
        self.query_chores("WHERE next_due < ?1", params![format_timestamp(&before)])
    }

    fn chores_due_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<Chore>> {
        self.query_chores(
            "WHERE next_due >= ?1 AND next_due < ?2",
            params![format_timestamp(&from), format_timestamp(&to)],
        )
    }

    fn count_chores(&self) -> Result<u64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM chores", [], |row| row.get::<_, u64>(0))?)
    }
}

impl CompletionLog for HouseholdDb {
    fn append_completion(&self, completion: &ChoreCompletion) -> Result<()> {
        self.conn.execute(
            "INSERT INTO chore_completions (id, chore_id, completed_by, completed_at, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                completion.id,
                completion.chore_id,
                completion.completed_by,
                format_timestamp(&completion.completed_at),
                completion.notes,
            ],
        )?;
        Ok(())
    }

    fn list_completions(
        &self,
        chore_id: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ChoreCompletion>> {
        let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
        match chore_id {
            Some(id) => self.query_completions("WHERE chore_id = ?1", limit, params![id]),
            None => self.query_completions("", limit, []),
        }
    }

    fn completions_since(&self, since: DateTime<Utc>) -> Result<Vec<ChoreCompletion>> {
        self.query_completions(
            "WHERE completed_at >= ?1",
            -1,
            params![format_timestamp(&since)],
        )
    }

    fn count_completions(&self) -> Result<u64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM chore_completions",
            [],
            |row| row.get::<_, u64>(0),
        )?)
    }
}
