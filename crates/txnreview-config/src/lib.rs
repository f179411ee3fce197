//! Configuration management for txnreview
//!
//! This module handles loading, validation, and defaults of the
//! txnreview configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigErrorCode, ConfigErrorDetails, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
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
    8081
}

/// Remote data service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// JSON fixture holding employees and transactions
    #[serde(default = "default_fixture_path")]
    pub fixture_path: PathBuf,
    /// Transactions per page of the paginated feed
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Simulated latency per remote call, in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            fixture_path: default_fixture_path(),
            page_size: default_page_size(),
            latency_ms: 0,
        }
    }
}

fn default_fixture_path() -> PathBuf {
    PathBuf::from("fixtures/data.json")
}

fn default_page_size() -> usize {
    5
}

/// Cache slot behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Drop feed responses that resolve after the slot was invalidated
    #[serde(default = "default_true")]
    pub discard_stale_responses: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            discard_stale_responses: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Remote data service settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        Self::from_yaml(&content)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml {
                message: e.to_string(),
            })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if self.backend.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        if self.backend.latency_ms > 60_000 {
            return Err(ConfigError::InvalidValue {
                field: "backend.latency_ms".to_string(),
                reason: "Latency must not exceed 60000 ms".to_string(),
            });
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Unknown log level '{}'", self.logging.level),
            });
        }

        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================
