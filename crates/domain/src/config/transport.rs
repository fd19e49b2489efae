use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Size budget for one outgoing datagram.
    #[serde(default = "default_max_send")]
    pub max_send: usize,

    /// Idle scratch buffers kept for reuse.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Names remembered per message as compression targets.
    #[serde(default = "default_compression_entries")]
    pub compression_entries: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_send: default_max_send(),
            pool_size: default_pool_size(),
            compression_entries: default_compression_entries(),
        }
    }
}

fn default_max_send() -> usize {
    512
}

fn default_pool_size() -> usize {
    16
}

fn default_compression_entries() -> usize {
    20
}
