use anyhow::Result;
use clap::{Parser, Subcommand};
use dontforget::config::{DontForgetConfig, Secrets};
use dontforget::{cli, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dontforget", version, about = "Private memory API with a read-only SQL agent")]
struct Cli {
    /// Config file (defaults to ~/.dontforget/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API
    Serve,
    /// Classify and store a note
    Remember {
        /// The note text
        text: String,
    },
    /// Ask a question about stored notes
    Remind {
        /// The question
        question: String,
    },
    /// Run one SQL query through the read-only guard, as the agent would
    Query {
        /// SQL text
        sql: String,
    },
    /// Export all notes as JSON to stdout
    Export,
    /// Check database health and configuration
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DontForgetConfig::load_from(path)?,
        None => DontForgetConfig::load()?,
    };

    // Log to stderr so stdout stays clean for command output
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            let secrets = Secrets::from_env()?;
            server::serve(config, secrets).await?;
        }
        Command::Remember { text } => cli::remember(&config, &text).await?,
        Command::Remind { question } => cli::remind(&config, &question).await?,
        Command::Query { sql } => cli::query(&config, &sql)?,
        Command::Export => cli::export(&config)?,
        Command::Doctor => cli::doctor(&config)?,
    }

    Ok(())
}
