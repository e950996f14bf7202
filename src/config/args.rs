use super::{ConfigError, ExporterConfig, LogFormat, LogLevel};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line flags. Any flag left unset falls back to the config file,
/// then to the built-in default.
#[derive(Debug, Parser)]
#[command(name = "sdtd_exporter")]
#[command(about = "Prometheus exporter for the 7 Days to Die dedicated server web API")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long = "config.file", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// The base URL of the dedicated server web API (e.g., http://127.0.0.1:8080)
    #[arg(long = "server.url", env = "SDTD_API_URL")]
    pub server_url: Option<String>,

    /// The name of the API token to use to authenticate with the web server
    #[arg(long = "server.token-name", env = "SDTD_TOKEN_NAME")]
    pub token_name: Option<String>,

    /// The secret of the API token to use to authenticate with the web server
    #[arg(long = "server.token-secret", env = "SDTD_TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// Timeout in seconds for each request to the web API
    #[arg(long = "server.timeout-secs", env = "SDTD_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Accept invalid TLS certificates from the web API
    #[arg(long = "server.insecure-skip-verify")]
    pub insecure_skip_verify: bool,

    /// Address on which to expose metrics and the landing page
    #[arg(long = "web.listen-address")]
    pub listen_address: Option<SocketAddr>,

    /// Path under which to expose metrics
    #[arg(long = "web.telemetry-path")]
    pub telemetry_path: Option<String>,

    /// Only log messages with the given severity or above
    #[arg(long = "log.level", value_enum)]
    pub log_level: Option<LogLevel>,

    /// Output format of log messages
    #[arg(long = "log.format", value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Builds the effective configuration and validates it.
    pub fn into_config(self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config_file {
            Some(path) => ExporterConfig::from_file(path)?,
            None => ExporterConfig::default(),
        };

        if let Some(url) = self.server_url {
            config.server.url = url;
        }
        if let Some(name) = self.token_name {
            config.server.token_name = Some(name);
        }
        if let Some(secret) = self.token_secret {
            config.server.token_secret = Some(secret);
        }
        if let Some(timeout) = self.timeout_secs {
            config.server.timeout_secs = timeout;
        }
        if self.insecure_skip_verify {
            config.server.insecure_skip_verify = true;
        }
        if let Some(addr) = self.listen_address {
            config.web.listen_address = addr;
        }
        if let Some(path) = self.telemetry_path {
            config.web.telemetry_path = path;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }

        config.validate()?;
        Ok(config)
    }
}
