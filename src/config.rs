use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Env var holding the reasoning-engine API key.
pub const ENGINE_KEY_VAR: &str = "GEMINI_API_KEY";
/// Env var holding the shared secret callers must present in `x-api-key`.
pub const SERVER_SECRET_VAR: &str = "DONTFORGET_SECRET_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DontForgetConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub model: ModelConfig,
    pub agent: AgentConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// Base URL of the Generative Language API, without the `/models/...` suffix.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum number of queries one question may run before the loop gives up.
    pub max_tool_calls: usize,
    /// Wall-clock budget for a whole question, model round-trips included.
    pub time_budget_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_dontforget_dir()
            .join("dontforget.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-2.0-flash".into(),
            temperature: 0.1,
            request_timeout_secs: 60,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_calls: 10,
            time_budget_secs: 120,
        }
    }
}

impl ModelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AgentConfig {
    pub fn time_budget(&self) -> Duration {
        Duration::from_secs(self.time_budget_secs)
    }
}

/// Returns `~/.dontforget/`, or `./.dontforget/` when no home directory is known.
pub fn default_dontforget_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dontforget")
}

/// Returns the default config file path: `~/.dontforget/config.toml`
pub fn default_config_path() -> PathBuf {
    default_dontforget_dir().join("config.toml")
}

impl DontForgetConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DontForgetConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (DONTFORGET_DB, DONTFORGET_LOG_LEVEL,
    /// DONTFORGET_HOST, DONTFORGET_PORT, DONTFORGET_MODEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DONTFORGET_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("DONTFORGET_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("DONTFORGET_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("DONTFORGET_PORT") {
            match val.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %val, "ignoring invalid DONTFORGET_PORT"),
            }
        }
        if let Ok(val) = std::env::var("DONTFORGET_MODEL") {
            self.model.model = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Secrets read from the environment only, never from the config file.
#[derive(Clone)]
pub struct Secrets {
    pub engine_api_key: String,
    pub server_secret: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("engine_api_key", &"<redacted>")
            .field("server_secret", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    /// Both secrets are required to run the HTTP server.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            engine_api_key: engine_key_from_env()?,
            server_secret: required_env(SERVER_SECRET_VAR)?,
        })
    }
}

/// The engine key alone, for one-shot CLI commands that never accept callers.
pub fn engine_key_from_env() -> Result<String> {
    required_env(ENGINE_KEY_VAR)
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => bail!("{name} missing from environment (or .env)"),
    }
}
