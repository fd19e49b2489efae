use async_trait::async_trait;
use dnswire_domain::config::TransportConfig;
use dnswire_domain::{DomainError, Message};
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use super::outgoing::{OutgoingMessage, SendOutcome};
use super::scratch_pool::ScratchPool;
use super::socket::create_udp_socket;
use crate::dns::wire::decode_message;

/// Application callback for decoded requests.
///
/// The response arrives seeded by [`Message::response_to`]; the handler adds
/// records and calls [`ServerResponse::send`], or drops it to stay silent.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    async fn handle(&self, request: Message, response: ServerResponse);
}

/// UDP listener decoding each datagram and dispatching it to a handler.
pub struct DnsServer {
    socket: Arc<UdpSocket>,
    pool: Arc<ScratchPool>,
    config: TransportConfig,
}

impl DnsServer {
    pub async fn bind(addr: SocketAddr, config: &TransportConfig) -> Result<Self, DomainError> {
        let socket = create_udp_socket(addr)?;
        Ok(Self::from_socket(socket, config))
    }

    pub fn from_socket(socket: UdpSocket, config: &TransportConfig) -> Self {
        Self {
            socket: Arc::new(socket),
            pool: Arc::new(ScratchPool::new(config.pool_size)),
            config: config.clone(),
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.socket.local_addr()?)
    }

    /// Receives forever. Malformed datagrams are logged and dropped; every
    /// decoded request runs the handler on its own task.
    pub async fn run<H: RequestHandler>(self, handler: Arc<H>) -> Result<(), DomainError> {
        info!(bind_address = %self.local_addr()?, "DNS server listening");

        loop {
            let received = {
                let mut scratch = self.pool.checkout();
                match self.socket.recv_from(&mut scratch).await {
                    Ok((len, peer)) => Ok((decode_message(&scratch[..len]), peer, len)),
                    Err(e) => Err(e),
                }
            };

            let (decoded, peer, len) = match received {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "UDP receive failed");
                    continue;
                }
            };

            let request = match decoded {
                Ok(request) => request,
                Err(e) => {
                    warn!(peer = %peer, bytes = len, error = %e, "Dropping malformed request");
                    continue;
                }
            };

            debug!(
                peer = %peer,
                id = request.header.id,
                questions = request.questions.len(),
                "Received DNS request"
            );

            let response = ServerResponse {
                outgoing: OutgoingMessage::new(Message::response_to(&request), peer, &self.config),
                socket: self.socket.clone(),
                pool: self.pool.clone(),
            };
            let handler = handler.clone();
            tokio::spawn(async move {
                handler.handle(request, response).await;
            });
        }
    }
}

/// The reply being built for one request.
///
/// Dereferences to the [`Message`] under construction.
pub struct ServerResponse {
    outgoing: OutgoingMessage,
    socket: Arc<UdpSocket>,
    pool: Arc<ScratchPool>,
}

impl ServerResponse {
    pub fn peer(&self) -> SocketAddr {
        self.outgoing.peer()
    }

    pub fn max_send(&self) -> usize {
        self.outgoing.max_send()
    }

    pub fn set_max_send(&mut self, max_send: usize) -> Result<(), DomainError> {
        self.outgoing.set_max_send(max_send)
    }

    /// Sends the message built on this response.
    pub async fn send(&self) -> Result<SendOutcome, DomainError> {
        self.outgoing
            .transmit(&self.socket, &self.pool, self.outgoing.message())
            .await
    }

    /// Sends `message` in place of the one built here, e.g. a relayed reply.
    pub async fn send_message(&self, message: &Message) -> Result<SendOutcome, DomainError> {
        self.outgoing.transmit(&self.socket, &self.pool, message).await
    }
}

impl Deref for ServerResponse {
    type Target = Message;

    fn deref(&self) -> &Message {
        self.outgoing.message()
    }
}

impl DerefMut for ServerResponse {
    fn deref_mut(&mut self) -> &mut Message {
        self.outgoing.message_mut()
    }
}
