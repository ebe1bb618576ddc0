//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::services::UpstreamConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication configuration
///
/// `tokens` maps bearer tokens to actor ids. When `trusted_header` is set,
/// an actor id in that header (injected by a fronting gateway) is accepted
/// as well.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub tokens: HashMap<String, String>,

    #[serde(default)]
    pub trusted_header: Option<String>,
}

/// Request rate limiting
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_max_requests() -> u32 {
    120
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

/// Upstream nutrition data API
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSection {
    #[serde(default = "default_upstream_url")]
    pub url: String,

    #[serde(default = "default_upstream_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_upstream_url() -> String {
    "http://localhost:8090".to_string()
}

fn default_upstream_timeout() -> u64 {
    5000
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            request_timeout_ms: default_upstream_timeout(),
            api_key: None,
        }
    }
}

impl From<&UpstreamSection> for UpstreamConfig {
    fn from(section: &UpstreamSection) -> Self {
        UpstreamConfig {
            base_url: section.url.clone(),
            request_timeout_ms: section.request_timeout_ms,
            api_key: section.api_key.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
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

        let config = Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Config file locations, in lookup order
    pub fn default_paths() -> Vec<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("nourish").join("config.toml"))
            .into_iter()
            .chain([
                PathBuf::from("/etc/nourish/config.toml"),
                PathBuf::from("./config.toml"),
            ])
            .collect()
    }

    /// Load from the first default location that exists, or the environment
    ///
    /// Returns the file that was used, if any. A file that exists but cannot
    /// be loaded is an error.
    pub fn load_default() -> Result<(Self, Option<PathBuf>), ConfigError> {
        Self::load_first(&Self::default_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => Ok((Self::load_with_env(path)?, Some(path.clone()))),
            None => Ok((Self::from_env()?, None)),
        }
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.enabled {
            if self.rate_limit.max_requests == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.max_requests must be at least 1".to_string(),
                ));
            }
            if self.rate_limit.window_secs == 0 {
                return Err(ConfigError::Invalid(
                    "rate_limit.window_secs must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = var("NOURISH_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("NOURISH_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Upstream overrides
        if let Some(url) = var("NOURISH_UPSTREAM_URL") {
            self.upstream.url = url;
        }
        if let Some(key) = var("NOURISH_UPSTREAM_API_KEY") {
            self.upstream.api_key = Some(key);
        }

        // Rate limit overrides
        if let Some(max) = var("NOURISH_RATE_LIMIT_MAX").and_then(|m| m.parse().ok()) {
            self.rate_limit.max_requests = max;
        }

        // Logging overrides
        if let Some(level) = var("NOURISH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("NOURISH_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Nourish Configuration
#
# Environment variables override these settings:
# - NOURISH_API_HOST
# - NOURISH_API_PORT
# - NOURISH_UPSTREAM_URL
# - NOURISH_UPSTREAM_API_KEY
# - NOURISH_RATE_LIMIT_MAX
# - NOURISH_LOG_LEVEL
# - NOURISH_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins (empty = same-origin only)
cors_origins = []

[auth]
# Header carrying an actor id set by a trusted gateway (optional)
# trusted_header = "x-actor-id"

# Bearer token -> actor id
[auth.tokens]
# "dev-token" = "00000000-0000-0000-0000-000000000001"

[rate_limit]
# Enable per-actor request limiting on dashboard routes
enabled = true

# Requests allowed per window (at least 1 while enabled)
max_requests = 120

# Window length in seconds
window_secs = 60

[upstream]
# Nutrition data API base URL
url = "http://localhost:8090"

# Request timeout in milliseconds
request_timeout_ms = 5000

# Optional bearer token for the nutrition data API
# api_key = ""

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
