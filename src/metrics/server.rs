//! HTTP server for the Prometheus scrape endpoint.

use super::{LandingPage, MetricsRegistry};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;

/// Content type of the Prometheus text exposition format.
const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Errors that can occur during metrics server operations.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    /// The landing page configuration was rejected.
    #[error("invalid landing page: {0}")]
    Landing(String),

    /// The server stopped with an I/O error.
    #[error("server error: {0}")]
    Server(String),
}

/// Configuration for the metrics server.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
    /// Path under which metrics are served.
    pub telemetry_path: String,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 9816).into(),
            telemetry_path: "/metrics".to_string(),
        }
    }
}

impl From<&crate::config::WebConfig> for MetricsServerConfig {
    fn from(web: &crate::config::WebConfig) -> Self {
        Self {
            bind_addr: web.listen_address,
            telemetry_path: web.telemetry_path.clone(),
        }
    }
}

/// Shared state for the metrics server.
struct MetricsState {
    registry: MetricsRegistry,
    landing: LandingPage,
}

/// HTTP server for exposing Prometheus metrics.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: Arc<MetricsState>,
}

impl MetricsServer {
    /// Creates a new metrics server.
    pub fn new(
        config: MetricsServerConfig,
        registry: MetricsRegistry,
        landing: LandingPage,
    ) -> Self {
        Self {
            config,
            state: Arc::new(MetricsState { registry, landing }),
        }
    }

    /// Builds the request router.
    ///
    /// The landing page is only mounted when it does not collide with
    /// the telemetry path.
    pub fn router(&self) -> Router {
        let mut router = Router::new().route(&self.config.telemetry_path, get(metrics_handler));
        if self.config.telemetry_path != "/" {
            router = router.route("/", get(landing_handler));
        }
        router
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.state))
    }

    /// Starts the HTTP server.
    ///
    /// Runs until Ctrl-C is received.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            path = %self.config.telemetry_path,
            "Metrics server listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        tracing::info!("Metrics server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

/// Handler for the telemetry endpoint.
///
/// Collection blocks on the upstream, so it runs on the blocking pool.
async fn metrics_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    let scrape = tokio::task::spawn_blocking(move || state.registry.encode()).await;

    match scrape {
        Ok(Ok(output)) => (StatusCode::OK, [(header::CONTENT_TYPE, TEXT_FORMAT)], output),
        Ok(Err(e)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Collection task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Failed to collect metrics: {}", e),
            )
        }
    }
}

/// Handler for the landing page.
async fn landing_handler(State(state): State<Arc<MetricsState>>) -> impl IntoResponse {
    Html(state.landing.html().to_string())
}
