use anyhow::anyhow;
use async_trait::async_trait;
use dnswire_domain::{Config, Message, ResponseCode};
use dnswire_infrastructure::dns::transport::socket::unspecified_for;
use dnswire_infrastructure::dns::{DnsClient, RequestHandler, ServerResponse};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Relays each request upstream and the upstream answer back.
///
/// Upstream silence past `timeout`, or an id collision with a request still
/// in flight, is answered with SERVFAIL.
pub struct ProxyHandler {
    client: DnsClient,
    upstream: SocketAddr,
    timeout: Duration,
}

impl ProxyHandler {
    pub fn new(client: DnsClient, upstream: SocketAddr, timeout: Duration) -> Self {
        Self {
            client,
            upstream,
            timeout,
        }
    }

    async fn forward(&self, request: &Message) -> anyhow::Result<Message> {
        let pending = self
            .client
            .request(self.upstream)
            .send_message(request)
            .await?;
        let id = pending.id();

        match tokio::time::timeout(self.timeout, pending.recv()).await {
            Ok(answer) => Ok(answer?),
            Err(_) => {
                self.client.cancel(id, self.upstream);
                Err(anyhow!(
                    "no answer from {} within {} ms",
                    self.upstream,
                    self.timeout.as_millis()
                ))
            }
        }
    }
}

#[async_trait]
impl RequestHandler for ProxyHandler {
    async fn handle(&self, request: Message, mut response: ServerResponse) {
        let peer = response.peer();
        let id = request.header.id;

        let sent = match self.forward(&request).await {
            Ok(answer) => {
                debug!(peer = %peer, id, upstream = %self.upstream, "Relaying upstream answer");
                response.send_message(&answer).await
            }
            Err(e) => {
                warn!(peer = %peer, id, upstream = %self.upstream, error = %e, "Upstream query failed");
                response.set_header(|h| {
                    h.ra = true;
                    h.rcode = ResponseCode::ServFail.to_u8();
                });
                response.send().await
            }
        };

        if let Err(e) = sent {
            warn!(peer = %peer, id, error = %e, "Failed to send reply");
        }
    }
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    let upstream: SocketAddr = config.client.upstream.parse()?;
    let client = DnsClient::bind(unspecified_for(upstream), &config.transport).await?;
    info!(upstream = %upstream, timeout_ms = config.client.query_timeout_ms, "Forwarding to upstream");

    let handler = ProxyHandler::new(client, upstream, config.client.query_timeout());
    super::start_dns_server(config, handler).await
}
