//! Exporter configuration.
//!
//! Settings come from an optional TOML file and are overridden by
//! command-line flags and environment variables (see [`Cli`]). Every
//! value is fixed for the lifetime of the process.

mod args;

pub use args::Cli;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The server URL does not parse or is not http(s) with a host.
    #[error("invalid server URL {0:?}: {1}")]
    InvalidUrl(String, String),
    /// Only one half of the token pair is set.
    #[error("token name and token secret must be set together")]
    IncompleteToken,
    /// The request timeout is zero.
    #[error("invalid request timeout (must be at least 1 second)")]
    InvalidTimeout,
    /// The telemetry path is not absolute.
    #[error("invalid telemetry path {0:?} (must start with '/')")]
    InvalidTelemetryPath(String),
    /// The telemetry path contains route parameter or wildcard syntax.
    #[error("invalid telemetry path {0:?} (route parameters and wildcards are not allowed)")]
    TelemetryPathSyntax(String),
    /// The config file could not be read.
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    /// The config file is not valid TOML for this format.
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Upstream web API settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Scrape endpoint settings.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Upstream web API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the dedicated server web API.
    pub url: String,
    /// Name of the API token used to authenticate.
    pub token_name: Option<String>,
    /// Secret of the API token used to authenticate.
    pub token_secret: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Accept invalid TLS certificates from the web API.
    pub insecure_skip_verify: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8080".to_string(),
            token_name: None,
            token_secret: None,
            timeout_secs: 10,
            insecure_skip_verify: false,
        }
    }
}

/// Web API token pair.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken {
    /// Token name, sent as `X-SDTD-API-TOKENNAME`.
    pub name: String,
    /// Token secret, sent as `X-SDTD-API-SECRET`.
    pub secret: String,
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiToken")
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl ServerConfig {
    /// Parses the base URL. Only `http` and `https` URLs with a host are accepted.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url)
            .map_err(|e| ConfigError::InvalidUrl(self.url.clone(), e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(
                self.url.clone(),
                format!("unsupported scheme {:?}", url.scheme()),
            ));
        }
        if url.host_str().is_none() {
            return Err(ConfigError::InvalidUrl(
                self.url.clone(),
                "missing host".to_string(),
            ));
        }
        Ok(url)
    }

    /// Returns the token pair, if configured. Empty values count as unset.
    pub fn api_token(&self) -> Result<Option<ApiToken>, ConfigError> {
        let name = self.token_name.as_deref().filter(|s| !s.is_empty());
        let secret = self.token_secret.as_deref().filter(|s| !s.is_empty());
        match (name, secret) {
            (Some(name), Some(secret)) => Ok(Some(ApiToken {
                name: name.to_string(),
                secret: secret.to_string(),
            })),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteToken),
        }
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validates the upstream settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.base_url()?;
        self.api_token()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

/// Scrape endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Address to bind the HTTP server to.
    pub listen_address: SocketAddr,
    /// Path under which metrics are exposed.
    pub telemetry_path: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            listen_address: ([0, 0, 0, 0], 9816).into(),
            telemetry_path: "/metrics".to_string(),
        }
    }
}

impl WebConfig {
    /// Validates the web settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.telemetry_path.starts_with('/') {
            return Err(ConfigError::InvalidTelemetryPath(
                self.telemetry_path.clone(),
            ));
        }
        // The router would treat these as captures and refuse the route.
        if self.telemetry_path.contains([':', '*', '{', '}']) {
            return Err(ConfigError::TelemetryPathSyntax(
                self.telemetry_path.clone(),
            ));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum level to emit.
    pub level: LogLevel,
    /// Output encoding.
    pub format: LogFormat,
}

/// Minimum level of emitted log records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Log output encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable key=value lines.
    #[default]
    Logfmt,
    /// One JSON object per line.
    Json,
}

impl ExporterConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.web.validate()
    }
}
