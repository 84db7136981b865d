//! Guarded execution of agent-written SQL.
//!
//! [`GuardedExecutor::execute`] never fails: refusals, SQLite errors and empty
//! result sets all come back as a [`QueryOutcome`] whose text is fed to the
//! model so it can correct its next query.

use anyhow::{anyhow, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Mutex;

use super::guard::{self, Refusal};
use crate::db;

/// Sentinel text for a query that ran and matched nothing.
pub const NO_RESULTS: &str = "No results found.";

/// Result of one guarded query, rendered to text with `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// JSON array of row objects, keys in column order.
    Rows(String),
    /// The query ran and returned zero rows.
    Empty,
    /// The query was refused before execution.
    Refused(Refusal),
    /// SQLite rejected or failed the query.
    Failed(String),
}

impl QueryOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Refused(_) | Self::Failed(_))
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rows(json) => f.write_str(json),
            Self::Empty => f.write_str(NO_RESULTS),
            Self::Refused(refusal) => write!(f, "{refusal}"),
            Self::Failed(message) => write!(f, "SQL Error: {message}"),
        }
    }
}

/// Something that can run a single read-only query for the agent.
///
/// Implementations are synchronous; async callers should use
/// `tokio::task::spawn_blocking`.
pub trait QueryExecutor: Send + Sync {
    fn execute(&self, sql: &str) -> QueryOutcome;
}

/// Production executor backed by a read-only SQLite connection.
pub struct GuardedExecutor {
    conn: Mutex<Connection>,
}

impl GuardedExecutor {
    /// Open a read-only connection to an existing note database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(db::open_read_only(path)?))
    }

    /// Use an existing connection. The text guard and the statement read-only
    /// check still apply, but the connection itself is not forced read-only.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn run(&self, sql: &str) -> Result<QueryOutcome> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("db lock poisoned: {e}"))?;

        let mut stmt = conn.prepare(sql)?;
        if !stmt.readonly() {
            return Ok(QueryOutcome::Refused(Refusal::NotReadOnly));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();

        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut fields = Vec::with_capacity(columns.len());
            for (idx, name) in columns.iter().enumerate() {
                fields.push((name.clone(), to_json(row.get_ref(idx)?)));
            }
            out.push(RowObject(fields));
        }

        if out.is_empty() {
            return Ok(QueryOutcome::Empty);
        }

        tracing::debug!(rows = out.len(), "query returned rows");
        Ok(QueryOutcome::Rows(serde_json::to_string(&out)?))
    }
}

impl QueryExecutor for GuardedExecutor {
    fn execute(&self, sql: &str) -> QueryOutcome {
        if let Err(refusal) = guard::check(sql) {
            tracing::warn!(sql = %sql, reason = ?refusal, "query refused by guard");
            return QueryOutcome::Refused(refusal);
        }

        match self.run(sql) {
            Ok(outcome) => {
                if let QueryOutcome::Refused(ref refusal) = outcome {
                    tracing::warn!(sql = %sql, reason = ?refusal, "query refused after prepare");
                }
                outcome
            }
            Err(e) => {
                tracing::debug!(sql = %sql, error = %e, "query failed");
                QueryOutcome::Failed(e.to_string())
            }
        }
    }
}

/// One result row. Serializes as a JSON object preserving column order.
struct RowObject(Vec<(String, Value)>);

impl Serialize for RowObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (column, value) in &self.0 {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Numbers stay numbers; anything JSON cannot carry natively becomes a string.
fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::String(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
