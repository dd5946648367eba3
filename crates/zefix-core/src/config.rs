//! Configuration Management
//!
//! Handles configuration from environment variables and TOML config files,
//! with defaults that target the public ZEFIX REST API.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default base URL of the ZEFIX public REST API
pub const DEFAULT_API_BASE_URL: &str = "https://www.zefix.admin.ch/ZefixPublicREST/api/v1";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Registry API access
    pub registry: RegistryConfig,

    /// Name extraction settings
    pub extraction: ExtractionConfig,

    /// CSV export settings
    pub export: ExportConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Registry
        if let Ok(url) = std::env::var("ZEFIX_API_URL") {
            config.registry.base_url = url;
        }
        if let Ok(user) = std::env::var("API_USERNAME") {
            config.registry.username = Some(user);
        }
        if let Ok(pass) = std::env::var("API_PASSWORD") {
            config.registry.password = Some(pass);
        }
        if let Ok(timeout) = std::env::var("ZEFIX_TIMEOUT_SECS") {
            config.registry.timeout_secs = parse_value("ZEFIX_TIMEOUT_SECS", timeout)?;
        }
        if let Ok(concurrency) = std::env::var("ZEFIX_CONCURRENCY") {
            config.registry.max_concurrent_requests =
                parse_value("ZEFIX_CONCURRENCY", concurrency)?;
        }

        // Extraction
        if let Ok(strategy) = std::env::var("EXTRACTION_STRATEGY") {
            config.extraction.strategy = strategy.parse()?;
        }
        if let Ok(dedup) = std::env::var("EXTRACTION_DEDUP") {
            config.extraction.deduplicate = parse_value("EXTRACTION_DEDUP", dedup)?;
        }

        // Export
        if let Ok(dir) = std::env::var("EXPORT_DIR") {
            config.export.output_dir = PathBuf::from(dir);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_value("LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|message| ConfigError::ParseError { path, message })
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        let defaults = Self::default();

        // Only override if env values differ from defaults
        if env_config.registry.base_url != defaults.registry.base_url {
            self.registry.base_url = env_config.registry.base_url;
        }
        if env_config.registry.timeout_secs != defaults.registry.timeout_secs {
            self.registry.timeout_secs = env_config.registry.timeout_secs;
        }
        if env_config.registry.max_concurrent_requests
            != defaults.registry.max_concurrent_requests
        {
            self.registry.max_concurrent_requests = env_config.registry.max_concurrent_requests;
        }
        if env_config.extraction.strategy != defaults.extraction.strategy {
            self.extraction.strategy = env_config.extraction.strategy;
        }
        if env_config.extraction.deduplicate != defaults.extraction.deduplicate {
            self.extraction.deduplicate = env_config.extraction.deduplicate;
        }
        if env_config.export.output_dir != defaults.export.output_dir {
            self.export.output_dir = env_config.export.output_dir;
        }
        if env_config.logging.level != defaults.logging.level {
            self.logging.level = env_config.logging.level;
        }
        if env_config.logging.json_format != defaults.logging.json_format {
            self.logging.json_format = env_config.logging.json_format;
        }

        // Always use env for credentials
        if env_config.registry.username.is_some() {
            self.registry.username = env_config.registry.username;
        }
        if env_config.registry.password.is_some() {
            self.registry.password = env_config.registry.password;
        }

        Ok(self)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Registry API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// API base URL
    pub base_url: String,

    /// Basic-auth user name
    pub username: Option<String>,

    /// Basic-auth password
    pub password: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Number of detail lookups in flight at once
    pub max_concurrent_requests: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            username: None,
            password: None,
            timeout_secs: 30,
            max_concurrent_requests: 4,
        }
    }
}

/// Name extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extraction strategy to use
    pub strategy: Strategy,

    /// Drop repeated names (first occurrence wins)
    pub deduplicate: bool,

    /// Separator used when rendering names into one CSV cell
    pub join_separator: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Rules,
            deduplicate: false,
            join_separator: "; ".to_string(),
        }
    }
}

/// Supported extraction strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Section/segment grammar over the notice text
    Rules,
    /// Language detection plus a per-language person-entity model
    Model,
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rules" | "rule" => Ok(Self::Rules),
            "model" => Ok(Self::Model),
            _ => Err(ConfigError::InvalidValue {
                key: "EXTRACTION_STRATEGY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rules => write!(f, "rules"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// CSV export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory the CSV file is written to
    pub output_dir: PathBuf,

    /// Appended to the search key to form the file name
    pub file_suffix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_suffix: "_companies.csv".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
