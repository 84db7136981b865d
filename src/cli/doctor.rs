//! CLI `doctor` command: run database diagnostics and print a health report.

use anyhow::{Context, Result};

use crate::config::{DontForgetConfig, ENGINE_KEY_VAR, SERVER_SECRET_VAR};
use crate::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &DontForgetConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    println!("DontForget Health Report");
    println!("========================");
    println!();
    println!("Secrets:");
    println!("  {ENGINE_KEY_VAR}:  {}", presence(ENGINE_KEY_VAR));
    println!("  {SERVER_SECRET_VAR}: {}", presence(SERVER_SECRET_VAR));
    println!("Model:             {}", config.model.model);
    println!(
        "Agent limits:      {} queries, {}s",
        config.agent.max_tool_calls, config.agent.time_budget_secs
    );
    println!();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `dontforget serve` or `dontforget remember` to initialize.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path)
        .context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("FTS5:              {}", if report.fts5_available { "available" } else { "MISSING" });
    println!("Notes:             {}", report.note_count);
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db {}", db_path.display());
        println!("  2. Or export what is readable: dontforget export > notes.json");
    }

    Ok(())
}

fn presence(var: &str) -> &'static str {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => "set",
        _ => "NOT SET",
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
