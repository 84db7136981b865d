use anyhow::Result;

use crate::config::DontForgetConfig;
use crate::query::{GuardedExecutor, QueryExecutor};

/// Run one SQL query through the guarded executor and print exactly what the
/// agent would see.
pub fn query(config: &DontForgetConfig, sql: &str) -> Result<()> {
    let db_path = config.resolved_db_path();
    // Creates the table on first use; held open so the WAL files stay in place
    let _writer = crate::db::open_database(&db_path)?;

    let executor = GuardedExecutor::open(&db_path)?;
    let outcome = executor.execute(sql);
    if outcome.is_error() {
        eprintln!("{outcome}");
    } else {
        println!("{outcome}");
    }
    Ok(())
}
