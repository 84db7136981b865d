use anyhow::Result;
use serde::Serialize;

use crate::config::DontForgetConfig;
use crate::notes::{Note, NoteStore};

/// Export format: wraps all notes.
#[derive(Debug, Serialize)]
struct ExportData {
    exported_at: String,
    notes: Vec<Note>,
}

/// Export all notes as JSON to stdout.
pub fn export(config: &DontForgetConfig) -> Result<()> {
    let store = NoteStore::open(config.resolved_db_path())?;
    let notes = store.all()?;

    let data = ExportData {
        exported_at: chrono::Local::now().to_rfc3339(),
        notes,
    };

    let json = serde_json::to_string_pretty(&data)?;
    println!("{json}");

    eprintln!("Exported {} notes.", data.notes.len());
    Ok(())
}
