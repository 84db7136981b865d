//! SQL DDL for the note table.
//!
//! A single FTS5 virtual table `memory` holds every note. `text` and `tags` are
//! full-text indexed; `timestamp` is stored `UNINDEXED` so it can only be
//! matched with `=`/`LIKE`. The DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

/// Name of the note table, as the agent sees it.
pub const NOTES_TABLE: &str = "memory";

/// Column names of the note table, in declaration order.
pub const NOTE_COLUMNS: [&str; 3] = ["text", "tags", "timestamp"];

const SCHEMA_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS memory USING fts5(
    text,
    tags,
    timestamp UNINDEXED
);
"#;

/// Initialize the note table. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)
}
