//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::BALANCE_TOLERANCE;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Journal engine tuning.
    #[serde(default)]
    pub journal: JournalConfig,
    /// Remote gateway client configuration.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Journal engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalConfig {
    /// Seconds of inactivity before a draft is autosaved.
    #[serde(default = "default_autosave_debounce")]
    pub autosave_debounce_secs: u64,
    /// Days between issue and due date of a synthesized debt detail.
    #[serde(default = "default_due_days")]
    pub default_due_days: u32,
    /// Debit/credit differences must stay below this to count as balanced.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_secs: default_autosave_debounce(),
            default_due_days: default_due_days(),
            balance_tolerance: default_balance_tolerance(),
        }
    }
}

fn default_autosave_debounce() -> u64 {
    30
}

fn default_due_days() -> u32 {
    30
}

fn default_balance_tolerance() -> Decimal {
    BALANCE_TOLERANCE
}

/// Configuration for editors talking to a remote Storebooks server.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the API, e.g. `https://books.example.com/api/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("STOREBOOKS").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
