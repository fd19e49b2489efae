use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::client::ClientConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::transport::TransportConfig;

const LOCAL_CONFIG: &str = "dnswire.toml";
const SYSTEM_CONFIG: &str = "/etc/dnswire/config.toml";

/// Largest datagram the writer can produce.
const MAX_MESSAGE_SIZE: usize = 65535;
/// A budget below one header cannot carry any message.
const MIN_MESSAGE_SIZE: usize = 12;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener used by the `serve` and `proxy` programs
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream and timeout settings for client-side requests
    #[serde(default)]
    pub client: ClientConfig,

    /// Datagram budget, scratch pool and compression settings
    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. dnswire.toml in current directory
    /// 3. /etc/dnswire/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG).exists() {
            Self::from_file(LOCAL_CONFIG)?
        } else if std::path::Path::new(SYSTEM_CONFIG).exists() {
            Self::from_file(SYSTEM_CONFIG)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.dns_port {
            self.server.dns_port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(upstream) = overrides.upstream {
            self.client.upstream = upstream;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_MESSAGE_SIZE..=MAX_MESSAGE_SIZE).contains(&self.transport.max_send) {
            return Err(ConfigError::Validation(format!(
                "transport.max_send must be between {} and {}, got {}",
                MIN_MESSAGE_SIZE, MAX_MESSAGE_SIZE, self.transport.max_send
            )));
        }

        if self.transport.pool_size == 0 {
            return Err(ConfigError::Validation(
                "transport.pool_size cannot be 0".to_string(),
            ));
        }

        if self.client.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "client.query_timeout_ms cannot be 0".to_string(),
            ));
        }

        self.client.upstream.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Validation(format!(
                "client.upstream '{}' is not an IP:PORT address: {}",
                self.client.upstream, e
            ))
        })?;

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub dns_port: Option<u16>,
    pub bind_address: Option<String>,
    pub upstream: Option<String>,
    pub log_level: Option<String>,
}
