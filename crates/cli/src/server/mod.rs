pub mod authoritative;
pub mod proxy;

use dnswire_domain::Config;
use dnswire_infrastructure::dns::{DnsServer, RequestHandler};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub async fn start_dns_server<H: RequestHandler>(config: &Config, handler: H) -> anyhow::Result<()> {
    let socket_addr: SocketAddr = config.server.listen_addr().parse()?;
    info!(bind_address = %socket_addr, max_send = config.transport.max_send, "Starting DNS server");

    let server = DnsServer::bind(socket_addr, &config.transport).await?;
    server.run(Arc::new(handler)).await?;
    Ok(())
}
