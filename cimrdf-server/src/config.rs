//! Server configuration

use clap::Parser;
use std::net::SocketAddr;
use thiserror::Error;
use uuid::Uuid;

/// Startup configuration failures; these terminate the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing UUID derivation seed: set UUID_SEED or pass --uuid-seed")]
    MissingSeed,
}

/// CIM identifier derivation HTTP server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "cimrdf-server")]
#[command(about = "UUIDv5 identifier derivation microservice for CIM JSON entities")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CIMRDF_LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: SocketAddr,

    /// Namespace string hashed into the UUIDv5 derivation seed
    #[arg(long, env = "UUID_SEED")]
    pub uuid_seed: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable CORS (Cross-Origin Resource Sharing)
    #[arg(long, env = "CIMRDF_CORS_ENABLED", default_value = "false")]
    pub cors_enabled: bool,
}

impl ServerConfig {
    /// The configured seed namespace with incidental whitespace removed.
    pub fn seed_namespace(&self) -> &str {
        self.uuid_seed.trim()
    }

    /// Derive the process-wide UUIDv5 seed from the configured namespace.
    pub fn seed(&self) -> Result<Uuid, ConfigError> {
        let namespace = self.seed_namespace();
        if namespace.is_empty() {
            return Err(ConfigError::MissingSeed);
        }
        Ok(Uuid::new_v5(&Uuid::nil(), namespace.as_bytes()))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            uuid_seed: String::new(),
            log_level: "info".to_string(),
            cors_enabled: false,
        }
    }
}
