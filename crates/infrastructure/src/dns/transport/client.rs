use dnswire_domain::config::TransportConfig;
use dnswire_domain::{DomainError, Message};
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::outgoing::OutgoingMessage;
use super::pending::{PendingKey, PendingTable};
use super::scratch_pool::ScratchPool;
use super::socket::create_udp_socket;
use crate::dns::events::{ResponseEvent, ResponseEventEmitter};
use crate::dns::wire::decode_message;

struct ClientInner {
    socket: UdpSocket,
    pending: PendingTable,
    pool: ScratchPool,
    events: ResponseEventEmitter,
    config: TransportConfig,
}

/// UDP client demultiplexing responses by `(id, peer)`.
///
/// One socket serves any number of outstanding requests. A background task
/// decodes every inbound datagram and completes the matching request; it is
/// stopped when the client is dropped.
pub struct DnsClient {
    inner: Arc<ClientInner>,
    receiver: JoinHandle<()>,
}

impl DnsClient {
    pub async fn bind(local: SocketAddr, config: &TransportConfig) -> Result<Self, DomainError> {
        Self::start(local, config, ResponseEventEmitter::disabled())
    }

    /// Like [`DnsClient::bind`], also returning every decoded response as an event.
    pub async fn bind_with_events(
        local: SocketAddr,
        config: &TransportConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ResponseEvent>), DomainError> {
        let (emitter, rx) = ResponseEventEmitter::channel();
        Ok((Self::start(local, config, emitter)?, rx))
    }

    fn start(
        local: SocketAddr,
        config: &TransportConfig,
        events: ResponseEventEmitter,
    ) -> Result<Self, DomainError> {
        let socket = create_udp_socket(local)?;
        let local_addr = socket.local_addr()?;

        let inner = Arc::new(ClientInner {
            socket,
            pending: PendingTable::new(),
            pool: ScratchPool::new(config.pool_size),
            events,
            config: config.clone(),
        });
        let receiver = tokio::spawn(receive_loop(inner.clone()));

        info!(local_address = %local_addr, "DNS client bound");
        Ok(Self { inner, receiver })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DomainError> {
        Ok(self.inner.socket.local_addr()?)
    }

    pub fn next_id() -> u16 {
        fastrand::u16(..)
    }

    /// Starts a request to `destination` with a fresh random id.
    pub fn request(&self, destination: SocketAddr) -> ClientRequest {
        let message = Message::new(Self::next_id());
        ClientRequest {
            outgoing: OutgoingMessage::new(message, destination, &self.inner.config),
            inner: self.inner.clone(),
        }
    }

    pub fn pending_count(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn submitted_at(&self, id: u16, destination: SocketAddr) -> Option<Instant> {
        self.inner.pending.submitted_at(id, destination)
    }

    /// Abandons an in-flight request; its waiter sees [`DomainError::RequestCancelled`].
    pub fn cancel(&self, id: u16, destination: SocketAddr) -> bool {
        self.inner.pending.cancel(id, destination)
    }

    pub fn expire_older_than(&self, age: Duration) -> Vec<PendingKey> {
        self.inner.pending.expire_older_than(age)
    }
}

impl Drop for DnsClient {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}

async fn receive_loop(inner: Arc<ClientInner>) {
    loop {
        let received = {
            let mut scratch = inner.pool.checkout();
            match inner.socket.recv_from(&mut scratch).await {
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

        let message = match decoded {
            Ok(message) => message,
            Err(e) => {
                warn!(peer = %peer, bytes = len, error = %e, "Dropping malformed response");
                continue;
            }
        };

        let id = message.header.id;
        let event_copy = inner.events.capture(&message);
        let matched = inner.pending.resolve(id, peer, message);
        debug!(peer = %peer, id, bytes = len, matched, "Received DNS response");

        if let Some(message) = event_copy {
            inner.events.publish(peer, message, matched);
        }
    }
}

/// A request being built for one destination.
///
/// Dereferences to the [`Message`] under construction.
pub struct ClientRequest {
    outgoing: OutgoingMessage,
    inner: Arc<ClientInner>,
}

impl ClientRequest {
    pub fn destination(&self) -> SocketAddr {
        self.outgoing.peer()
    }

    pub fn set_max_send(&mut self, max_send: usize) -> Result<(), DomainError> {
        self.outgoing.set_max_send(max_send)
    }

    /// Sends the message built on this request.
    pub async fn send(self) -> Result<PendingResponse, DomainError> {
        self.dispatch(self.outgoing.message()).await
    }

    /// Sends `message` to this request's destination instead, keyed by its own id.
    pub async fn send_message(self, message: &Message) -> Result<PendingResponse, DomainError> {
        self.dispatch(message).await
    }

    async fn dispatch(&self, message: &Message) -> Result<PendingResponse, DomainError> {
        let id = message.header.id;
        let destination = self.outgoing.peer();
        let rx = self.inner.pending.register(id, destination)?;

        let outcome = match self
            .outgoing
            .transmit(&self.inner.socket, &self.inner.pool, message)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                self.inner.pending.cancel(id, destination);
                return Err(e);
            }
        };

        if outcome.bytes == 0 {
            self.inner.pending.cancel(id, destination);
            return Err(DomainError::SizeError(format!(
                "max_send {} cannot hold a message header",
                self.outgoing.max_send()
            )));
        }

        Ok(PendingResponse {
            id,
            destination,
            rx,
        })
    }
}

impl Deref for ClientRequest {
    type Target = Message;

    fn deref(&self) -> &Message {
        self.outgoing.message()
    }
}

impl DerefMut for ClientRequest {
    fn deref_mut(&mut self) -> &mut Message {
        self.outgoing.message_mut()
    }
}

/// Handle to the response of a sent request.
#[derive(Debug)]
pub struct PendingResponse {
    id: u16,
    destination: SocketAddr,
    rx: oneshot::Receiver<Message>,
}

impl PendingResponse {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    /// Waits for the matching response. Fails with `RequestCancelled` if the
    /// entry was cancelled or expired first.
    pub async fn recv(self) -> Result<Message, DomainError> {
        self.rx.await.map_err(|_| DomainError::RequestCancelled)
    }
}
