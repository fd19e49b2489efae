pub mod client;
pub mod errors;
pub mod logging;
pub mod root;
pub mod server;
pub mod transport;

pub use client::ClientConfig;
pub use errors::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use root::{CliOverrides, Config};
pub use server::ServerConfig;
pub use transport::TransportConfig;
