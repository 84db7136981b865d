pub mod schema;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// How long a connection waits on a locked database before failing.
pub const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open (or create) the note database at the given path with the schema initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {}", path.display()))?;

    // WAL lets the read-only query connection run alongside appends
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    schema::init_schema(&conn).context("failed to initialize schema")?;

    tracing::info!(path = %path.display(), "database initialized");
    Ok(conn)
}

/// Open an existing database for queries only.
///
/// The connection is opened `SQLITE_OPEN_READ_ONLY` and additionally pinned with
/// `PRAGMA query_only`, so SQLite itself rejects any write that slips past the
/// query guard. The database must already exist (see [`open_database`]).
pub fn open_read_only(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;

    let conn = Connection::open_with_flags(path, flags).with_context(|| {
        format!("failed to open database read-only at {}", path.display())
    })?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.pragma_update(None, "query_only", "ON")?;

    tracing::debug!(path = %path.display(), "read-only connection opened");
    Ok(conn)
}

/// Result of a database health check.
#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub integrity_ok: bool,
    pub integrity_details: String,
    pub fts5_available: bool,
    pub note_count: i64,
}

/// Run `PRAGMA integrity_check`, probe FTS5 support, and count stored notes.
pub fn check_database_health(conn: &Connection) -> Result<HealthReport> {
    let integrity_details: String = conn
        .query_row("PRAGMA integrity_check", [], |row| row.get(0))
        .context("integrity check failed to run")?;
    let integrity_ok = integrity_details == "ok";

    let fts5_available: bool = conn
        .query_row(
            "SELECT sqlite_compileoption_used('ENABLE_FTS5')",
            [],
            |row| row.get::<_, i64>(0),
        )
        .map(|used| used == 1)
        .unwrap_or(false);

    let note_count: i64 = conn
        .query_row(
            &format!("SELECT COUNT(*) FROM {}", schema::NOTES_TABLE),
            [],
            |row| row.get(0),
        )
        .context("failed to count notes")?;

    Ok(HealthReport {
        integrity_ok,
        integrity_details,
        fts5_available,
        note_count,
    })
}

/// Open an in-memory database for testing.
#[cfg(test)]
pub fn open_memory_database() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
    schema::init_schema(&conn).context("failed to initialize schema")?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_check_on_fresh_db() {
        let conn = open_memory_database().unwrap();
        let report = check_database_health(&conn).unwrap();
        assert!(report.integrity_ok);
        assert_eq!(report.note_count, 0);
    }

    #[test]
    fn read_only_connection_rejects_writes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("ro.db");
        let _writer = open_database(&path).unwrap();

        let reader = open_read_only(&path).unwrap();
        let result = reader.execute(
            "INSERT INTO memory (text, tags, timestamp) VALUES ('x', 'y', 'z')",
            [],
        );
        assert!(result.is_err());
    }
}
