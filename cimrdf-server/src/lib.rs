//! CIM identifier derivation HTTP server
//!
//! A thin HTTP wrapper around `cimrdf-core`, rewriting fields of posted JSON
//! entities to deterministic RFC 4122 UUIDv5 identifiers.
//!
//! # Routes
//!
//! - `POST /` - derive `_id` under the `rdf:type` namespace
//! - `POST /:field` - derive the given fields under the `rdf:type` namespace
//! - `POST /:field/:namespace` - derive under an explicit namespace
//! - `GET /health` - liveness check
//!
//! # Example
//!
//! ```ignore
//! use cimrdf_server::{CimServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         uuid_seed: "my-pipeline".to_string(),
//!         ..Default::default()
//!     };
//!     let server = CimServer::new(config).unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, ServerConfig};
pub use error::{Result, ServerError};
pub use state::AppState;
pub use telemetry::{init_logging, TelemetryConfig};

use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// CIM identifier derivation HTTP server
pub struct CimServer {
    /// Application state
    state: Arc<AppState>,
    /// Configured router
    router: Router,
}

impl CimServer {
    /// Create a new server with the given configuration
    pub fn new(config: ServerConfig) -> std::result::Result<Self, ConfigError> {
        let state = Arc::new(AppState::new(config)?);
        let router = routes::build_router(state.clone());
        Ok(Self { state, router })
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get the router for testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server
    pub async fn run(self) -> std::io::Result<()> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;

        info!(
            addr = %addr,
            seed = %self.state.seed(),
            namespace = self.state.config.seed_namespace(),
            "Started RFC 4122 urn:uuid UUIDv5 derivation service"
        );

        axum::serve(listener, self.router).await
    }
}
