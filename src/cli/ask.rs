//! CLI `remember` and `remind`: run the ingestion or recall path once from the terminal.

use anyhow::{Context, Result};

use crate::config::{self, DontForgetConfig};
use crate::service::MemoryService;

/// Classify and store a note, printing the assigned tags.
pub async fn remember(config: &DontForgetConfig, text: &str) -> Result<()> {
    let service = open_service(config)?;
    let saved = service.remember(text).await.context("remember failed")?;
    println!("Saved with tags: {}", saved.tags);
    Ok(())
}

/// Ask a question and print the agent's answer.
pub async fn remind(config: &DontForgetConfig, question: &str) -> Result<()> {
    let service = open_service(config)?;
    let answer = service.remind(question).await.context("memory retrieval failed")?;
    println!("{}", answer.text);
    eprintln!("({} quer{} run)", answer.tool_calls, if answer.tool_calls == 1 { "y" } else { "ies" });
    Ok(())
}

fn open_service(config: &DontForgetConfig) -> Result<MemoryService> {
    let api_key = config::engine_key_from_env()?;
    MemoryService::from_config(config, &api_key)
}
