//! Shared application state

use crate::config::{ConfigError, ServerConfig};
use cimrdf_core::IdentifierDeriver;
use uuid::Uuid;

/// Immutable per-process state threaded through all handlers.
pub struct AppState {
    /// Parsed startup configuration.
    pub config: ServerConfig,
    /// Field deriver carrying the process-wide UUIDv5 seed.
    pub deriver: IdentifierDeriver,
}

impl AppState {
    /// Build the application state, deriving the seed from configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ConfigError> {
        let deriver = IdentifierDeriver::new(config.seed()?);
        Ok(Self { config, deriver })
    }

    /// The process-wide derivation seed.
    pub fn seed(&self) -> Uuid {
        self.deriver.seed()
    }
}
