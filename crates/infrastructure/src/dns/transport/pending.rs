use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dnswire_domain::{DomainError, Message};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::debug;

/// Key of an in-flight request: message id and the peer it was sent to.
pub type PendingKey = (u16, SocketAddr);

/// An in-flight request waiting for its response.
#[derive(Debug)]
pub struct PendingRequest {
    pub submitted_at: Instant,
    responder: oneshot::Sender<Message>,
}

/// Requests awaiting a response, matched on `(id, peer)`.
///
/// Entries leave the table when a response matches, when the caller cancels,
/// or through [`PendingTable::expire_older_than`]. Nothing expires on its own.
#[derive(Debug, Default)]
pub struct PendingTable {
    entries: DashMap<PendingKey, PendingRequest>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request, refusing a key that is already in flight.
    pub fn register(
        &self,
        id: u16,
        peer: SocketAddr,
    ) -> Result<oneshot::Receiver<Message>, DomainError> {
        match self.entries.entry((id, peer)) {
            Entry::Occupied(_) => Err(DomainError::DuplicateRequest {
                id,
                peer: peer.to_string(),
            }),
            Entry::Vacant(slot) => {
                let (tx, rx) = oneshot::channel();
                slot.insert(PendingRequest {
                    submitted_at: Instant::now(),
                    responder: tx,
                });
                Ok(rx)
            }
        }
    }

    /// Hands `message` to the waiter for `(id, peer)`. Returns false when no
    /// request matched.
    pub fn resolve(&self, id: u16, peer: SocketAddr, message: Message) -> bool {
        match self.entries.remove(&(id, peer)) {
            Some((_, pending)) => {
                if pending.responder.send(message).is_err() {
                    debug!(id, peer = %peer, "Response arrived after the caller stopped waiting");
                }
                true
            }
            None => false,
        }
    }

    /// Drops the entry; its waiter sees the request as cancelled.
    pub fn cancel(&self, id: u16, peer: SocketAddr) -> bool {
        self.entries.remove(&(id, peer)).is_some()
    }

    /// Removes every entry submitted at least `age` ago and returns their keys.
    pub fn expire_older_than(&self, age: Duration) -> Vec<PendingKey> {
        let expired: Vec<PendingKey> = self
            .entries
            .iter()
            .filter(|entry| entry.submitted_at.elapsed() >= age)
            .map(|entry| *entry.key())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "Expired pending requests");
        }
        expired
    }

    pub fn submitted_at(&self, id: u16, peer: SocketAddr) -> Option<Instant> {
        self.entries.get(&(id, peer)).map(|entry| entry.submitted_at)
    }

    pub fn contains(&self, id: u16, peer: SocketAddr) -> bool {
        self.entries.contains_key(&(id, peer))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
