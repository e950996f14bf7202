//! SDTD Exporter
//!
//! Serves 7 Days to Die dedicated server statistics for Prometheus.

use clap::Parser;
use sdtd_exporter::{
    config::{Cli, ExporterConfig},
    logging,
    metrics::{
        LandingConfig, LandingLink, LandingPage, MetricsRegistry, MetricsServer,
        MetricsServerConfig, ServerCollector,
    },
    Error, SdtdClient, EXPORTER_NAME, VERSION,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.log);

    info!(version = VERSION, "Starting {}", EXPORTER_NAME);

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Exporter failed");
            ExitCode::FAILURE
        }
    }
}

fn run(config: ExporterConfig) -> Result<(), Error> {
    // The blocking client must not be created from async context.
    let client = SdtdClient::new(&config.server)?;
    info!(url = %client.base_url(), "Using web API");

    let collector = ServerCollector::new(Arc::new(client))?;
    let registry = MetricsRegistry::new(collector)?;

    let landing = LandingPage::new(&LandingConfig {
        name: "SDTD Exporter".to_string(),
        description: "Prometheus exporter for 7 Days to Die dedicated servers".to_string(),
        version: VERSION.to_string(),
        links: vec![LandingLink {
            address: config.web.telemetry_path.clone(),
            text: "Metrics".to_string(),
        }],
    })?;

    let server = MetricsServer::new(MetricsServerConfig::from(&config.web), registry, landing);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(Error::Runtime)?;
    runtime.block_on(server.run())?;
    Ok(())
}
