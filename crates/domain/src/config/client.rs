use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Upstream server used by the forwarding proxy.
    #[serde(default = "default_upstream")]
    pub upstream: String,

    /// How long a caller waits for a matching response before giving up.
    /// The pending table itself never expires entries.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl ClientConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            upstream: default_upstream(),
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

fn default_upstream() -> String {
    "4.2.2.1:53".to_string()
}

fn default_query_timeout_ms() -> u64 {
    5000
}
