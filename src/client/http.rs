//! Blocking HTTP client for the dedicated server web API.

use super::{ClientError, ServerStats, StatsClient};
use crate::config::ServerConfig;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

const TOKEN_NAME_HEADER: &str = "x-sdtd-api-tokenname";
const TOKEN_SECRET_HEADER: &str = "x-sdtd-api-secret";

const USER_STATUS_PATH: &str = "userstatus";
const SERVER_STATS_PATH: &str = "api/serverstats";

/// Response envelope of `/api/serverstats`.
#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    data: ServerStats,
}

/// Client for the 7 Days to Die web API.
#[derive(Debug)]
pub struct SdtdClient {
    http: HttpClient,
    base_url: Url,
}

impl SdtdClient {
    /// Builds a client from upstream settings.
    ///
    /// Fails if the URL or token pair is invalid or the TLS backend
    /// cannot be initialized. No request is made here.
    pub fn new(config: &ServerConfig) -> Result<Self, ClientError> {
        config
            .validate()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        let mut base_url = config
            .base_url()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        // Url::join drops the last segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = config
            .api_token()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?
        {
            headers.insert(TOKEN_NAME_HEADER, header_value(&token.name, false)?);
            headers.insert(TOKEN_SECRET_HEADER, header_value(&token.secret, true)?);
        }

        let http = HttpClient::builder()
            .user_agent(concat!("sdtd_exporter/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout())
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;

        tracing::debug!(
            base_url = %base_url,
            timeout_secs = config.timeout_secs,
            "Web API client configured"
        );

        Ok(Self { http, base_url })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))
    }
}

impl StatsClient for SdtdClient {
    fn connect(&self) -> Result<(), ClientError> {
        let url = self.endpoint(USER_STATUS_PATH)?;
        let response = self
            .http
            .get(url.clone())
            .send()
            .map_err(|e| ClientError::ConnectFailed {
                endpoint: url.to_string(),
                reason: e.to_string(),
            })?;
        check_status(&url, response.status())?;

        tracing::trace!(endpoint = %url, "Web API reachable");
        Ok(())
    }

    fn server_stats(&self) -> Result<ServerStats, ClientError> {
        let url = self.endpoint(SERVER_STATS_PATH)?;
        let request_failed = |e: reqwest::Error| ClientError::RequestFailed {
            endpoint: url.to_string(),
            reason: e.to_string(),
        };

        let response = self.http.get(url.clone()).send().map_err(request_failed)?;
        check_status(&url, response.status())?;
        let body = response.bytes().map_err(request_failed)?;

        let stats = parse_stats(&url, &body)?;
        tracing::trace!(endpoint = %url, ?stats, "Fetched server stats");
        Ok(stats)
    }
}

fn header_value(value: &str, sensitive: bool) -> Result<HeaderValue, ClientError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|e| ClientError::InvalidConfig(format!("invalid API token: {}", e)))?;
    header.set_sensitive(sensitive);
    Ok(header)
}

fn check_status(url: &Url, status: StatusCode) -> Result<(), ClientError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ClientError::UnexpectedStatus {
            endpoint: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn parse_stats(url: &Url, body: &[u8]) -> Result<ServerStats, ClientError> {
    serde_json::from_slice::<StatsEnvelope>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| ClientError::Decode {
            endpoint: url.to_string(),
            reason: e.to_string(),
        })
}
