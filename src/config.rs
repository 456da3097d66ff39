//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `CREDIT_RISK_*` environment overrides.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{ClientConfig, DEFAULT_API_BASE};
use crate::mappings::{MappingError, Mappings};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: RemoteApiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Category label overrides: `domain -> code -> label`
    #[serde(default)]
    pub mappings: BTreeMap<String, BTreeMap<String, String>>,
}

/// Remote scoring API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for RemoteApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Dashboard web server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8084
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Dashboard behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_health_poll")]
    pub health_poll_secs: u64,

    #[serde(default = "default_per_page")]
    pub default_per_page: u32,
}

fn default_health_poll() -> u64 {
    30
}

fn default_per_page() -> u32 {
    20
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            health_poll_secs: default_health_poll(),
            default_per_page: default_per_page(),
        }
    }
}

impl DashboardConfig {
    /// Health polling interval, never shorter than one second
    pub fn health_poll_interval(&self) -> Duration {
        Duration::from_secs(self.health_poll_secs.max(1))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        // Surface bad mapping overrides at load time rather than at install
        config.build_mappings()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Remote API overrides
        if let Some(url) = lookup("CREDIT_RISK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(secs) = lookup("CREDIT_RISK_API_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.api.request_timeout_secs = secs;
        }

        // Server overrides
        if let Some(host) = lookup("CREDIT_RISK_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CREDIT_RISK_PORT").and_then(|s| s.parse().ok()) {
            self.server.port = port;
        }

        // Dashboard overrides
        if let Some(secs) = lookup("CREDIT_RISK_HEALTH_POLL_SECS").and_then(|s| s.parse().ok()) {
            self.dashboard.health_poll_secs = secs;
        }

        // Logging overrides
        if let Some(level) = lookup("CREDIT_RISK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CREDIT_RISK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Client settings for the remote API
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout_ms: self.api.request_timeout_secs.saturating_mul(1000),
        }
    }

    /// Built-in tables with the `[mappings]` overrides applied
    pub fn build_mappings(&self) -> Result<Mappings, ConfigError> {
        Ok(Mappings::with_overrides(&self.mappings)?)
    }

    /// Install the configured tables process-wide.
    ///
    /// Does nothing when no overrides are configured.
    pub fn install_mappings(&self) -> Result<(), ConfigError> {
        if self.mappings.is_empty() {
            return Ok(());
        }
        let tables = self.build_mappings()?;
        crate::mappings::replace_mappings(tables);
        Ok(())
    }
}

/// Candidate config file locations, in lookup order
pub fn default_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("credit-risk").join("config.toml")),
        Some(PathBuf::from("/etc/credit-risk/config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid category mapping: {0}")]
    Mapping(#[from] MappingError),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Credit Risk Dashboard Configuration
#
# Environment variables override these settings:
# - CREDIT_RISK_API_URL
# - CREDIT_RISK_API_TIMEOUT
# - CREDIT_RISK_HOST
# - CREDIT_RISK_PORT
# - CREDIT_RISK_HEALTH_POLL_SECS
# - CREDIT_RISK_LOG_LEVEL
# - CREDIT_RISK_LOG_FORMAT

[api]
# Base URL of the scoring API, including the /api prefix
base_url = "{base_url}"

# Request timeout in seconds
request_timeout_secs = 30

[server]
# Dashboard server host
host = "0.0.0.0"

# Dashboard server port
port = 8084

# Allowed CORS origins (empty allows any origin)
cors_origins = []

[dashboard]
# How often to poll the API health endpoint (seconds)
health_poll_secs = 30

# Rows per page in the data explorer: 10, 20, 50 or 100
default_per_page = 20

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/credit-risk/dashboard.log"

# Category label overrides, keyed by domain then code.
# Domains: home_ownership, loan_intent, loan_grade, default_on_file, loan_status
#
# [mappings.home_ownership]
# 0 = "OWN"
# 1 = "MORTGAGE"
# 2 = "RENT"
# 3 = "OTHER"
"#,
        base_url = DEFAULT_API_BASE
    )
}
