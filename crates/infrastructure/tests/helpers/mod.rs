#![allow(dead_code)]
mod builders;

pub use builders::*;

use dnswire_domain::config::TransportConfig;
use dnswire_infrastructure::dns::{DnsServer, RequestHandler};
use std::net::SocketAddr;
use std::sync::Arc;

pub fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

/// Binds a server on an ephemeral loopback port and runs it in the background.
pub async fn spawn_server<H: RequestHandler>(handler: H) -> SocketAddr {
    let server = DnsServer::bind(loopback(), &TransportConfig::default())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run(Arc::new(handler)));
    addr
}
