//! CIM derivation server CLI
//!
//! Run with: `cargo run -p cimrdf-server -- --help`

use cimrdf_server::{init_logging, CimServer, ServerConfig, TelemetryConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    let telemetry = TelemetryConfig::with_level(&config.log_level);
    init_logging(&telemetry);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.listen_addr,
        cors = config.cors_enabled,
        "Starting cimrdf server"
    );

    let server = CimServer::new(config)?;
    server.run().await.map_err(Into::into)
}
