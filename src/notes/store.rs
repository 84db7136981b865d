//! Write path and bulk reads for the note table.
//!
//! [`NoteStore`] owns the single read-write connection. Search never goes
//! through here: the agent reads notes via the guarded query executor.

use anyhow::{anyhow, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::db;
use crate::notes::types::Note;

/// Shared handle to the note table. Cheap to clone.
#[derive(Clone)]
pub struct NoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl NoteStore {
    /// Open (or create) the store at `path`. Creates the table if absent.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(db::open_database(path)?))
    }

    /// Wrap an already-initialized connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Append a note. Notes are never modified afterwards.
    pub fn append(&self, note: &Note) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO memory (text, tags, timestamp) VALUES (?1, ?2, ?3)",
            params![note.text, note.tags, note.timestamp],
        )?;

        tracing::debug!(
            rowid = conn.last_insert_rowid(),
            tags = %note.tags,
            "note appended"
        );
        Ok(())
    }

    /// All notes, oldest first.
    pub fn all(&self) -> Result<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT text, tags, timestamp FROM memory ORDER BY rowid")?;
        let notes = stmt
            .query_map([], |row| {
                Ok(Note {
                    text: row.get(0)?,
                    tags: row.get(1)?,
                    timestamp: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notes)
    }

    /// Number of stored notes.
    pub fn count(&self) -> Result<i64> {
        let conn = self.lock()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM memory", [], |row| row.get(0))?)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow!("db lock poisoned: {e}"))
    }
}
