//! Configuration structures.
//!
//! Configuration is read once at startup: defaults, then an optional JSON
//! file, then `GCAL_*` environment variables (CLI flags are applied on top by
//! the binary).

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use super::errors::{Error, Result};

/// Google Calendar v3 REST base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Global gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Calendar API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Credential broker configuration.
    #[serde(default)]
    pub broker: BrokerConfig,

    /// Token resolution / caching.
    #[serde(default)]
    pub auth: AuthConfig,

    /// IPC transport configuration.
    #[serde(default)]
    pub ipc: IpcConfig,
}

impl Config {
    /// Load a JSON config file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Apply `GCAL_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GCAL_LISTEN_ADDR") {
            self.server.listen_addr = v;
        }
        if let Some(v) = lookup("GCAL_API_BASE_URL") {
            self.api.base_url = v;
        }
        if let Some(v) = lookup("GCAL_BROKER_URL") {
            self.broker.base_url = v;
        }
        if let Some(v) = lookup("GCAL_BROKER_API_KEY") {
            self.broker.api_key = v;
        }
        if let Some(v) = lookup("GCAL_CONNECTION") {
            self.broker.connection = v;
        }
    }

    /// Reject configurations the gateway cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.broker.base_url.trim().is_empty() {
            return Err(Error::config("broker.base_url is required (GCAL_BROKER_URL)"));
        }
        if self.broker.api_key.trim().is_empty() {
            return Err(Error::config("broker.api_key is required (GCAL_BROKER_API_KEY)"));
        }
        if self.broker.connection.trim().is_empty() {
            return Err(Error::config("broker.connection cannot be empty"));
        }
        reqwest::Url::parse(&self.api.base_url)
            .map_err(|e| Error::config(format!("api.base_url is not a valid URL: {}", e)))?;
        reqwest::Url::parse(&self.broker.base_url)
            .map_err(|e| Error::config(format!("broker.base_url is not a valid URL: {}", e)))?;
        Ok(())
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IPC server bind address (TCP).
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:50061".to_string(),
        }
    }
}

/// Calendar API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Versioned REST base URL.
    pub base_url: String,

    /// Per-request timeout for calendar API calls.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Credential broker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker base URL.
    pub base_url: String,

    /// API key identifying this deployment to the broker.
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Connection slug the broker stores calendar tokens under.
    pub connection: String,

    /// Per-request timeout for broker calls.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            connection: "gcal".to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Token resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Upper bound on how long a resolved credential stays in the in-process
    /// cache. Zero disables caching.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,

    /// Tokens expiring within this window are treated as already expired.
    #[serde(with = "humantime_serde")]
    pub expiry_skew: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            expiry_skew: Duration::from_secs(30),
        }
    }
}

/// IPC transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Maximum frame payload size in bytes.
    pub max_frame_bytes: u32,

    /// Maximum concurrent TCP connections. Connections beyond this limit
    /// are rejected.
    pub max_connections: usize,

    /// Read timeout in seconds per frame. Connections idle beyond this
    /// duration are dropped.
    pub read_timeout_secs: u64,

    /// Write timeout in seconds per frame.
    pub write_timeout_secs: u64,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            max_frame_bytes: 5 * 1024 * 1024,
            max_connections: 256,
            read_timeout_secs: 300,
            write_timeout_secs: 10,
        }
    }
}
