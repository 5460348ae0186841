use learnpath_core::config::{Config, ConfigError};
use std::net::SocketAddr;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: SocketAddr,
    /// Provider, credentials and pipeline settings shared with the CLI.
    pub core: Config,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let core = Config::from_env()?;

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| DEFAULT_BIND_ADDRESS.to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        Ok(Self { bind_address, core })
    }
}
