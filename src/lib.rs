//! DontForget, a private memory service.
//!
//! Callers submit free-text notes, which are tagged by a reasoning engine and
//! appended to an SQLite FTS5 table. Questions are answered by an agent that
//! writes SQL against that table through a single read-only capability,
//! observes the results, and decides when it has enough to answer.
//!
//! # Architecture
//!
//! - **Storage**: one FTS5 virtual table `memory(text, tags, timestamp UNINDEXED)`
//! - **Query capability**: keyword guard, single-statement check,
//!   `sqlite3_stmt_readonly`, and a read-only connection
//! - **Reasoning engine**: Gemini `generateContent` over HTTPS
//! - **Transport**: HTTP (axum) behind a shared-secret header
//!
//! # Modules
//!
//! - [`config`]: Configuration from TOML and environment, plus required secrets
//! - [`db`]: SQLite open (read-write and read-only), schema, health checks
//! - [`notes`]: Note type and the append-only note store
//! - [`query`]: Guarded Query Executor
//! - [`llm`]: Reasoning-engine trait, conversation types, Gemini client
//! - [`classifier`]: One-shot tag classification
//! - [`agent`]: The tool-calling loop
//! - [`service`]: Ingestion and recall paths
//! - [`server`]: HTTP API
//! - [`cli`]: Operator commands

pub mod agent;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod db;
pub mod llm;
pub mod notes;
pub mod query;
pub mod server;
pub mod service;
