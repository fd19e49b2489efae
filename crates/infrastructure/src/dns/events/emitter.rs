//! Delivery of response events from the client receive loop.

use super::ResponseEvent;
use dnswire_domain::Message;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tracing::trace;

/// Publishes every well-formed response a client socket receives.
///
/// A response is reported whether or not a pending request claimed it, so a
/// subscriber also sees late answers to cancelled or expired requests and
/// datagrams nobody asked for. Malformed datagrams never become events.
/// Delivery is best effort: once the receiver is dropped, events are discarded.
#[derive(Clone, Default)]
pub struct ResponseEventEmitter {
    sender: Option<mpsc::UnboundedSender<ResponseEvent>>,
}

impl ResponseEventEmitter {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ResponseEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// True while a receiver is still listening.
    pub fn is_enabled(&self) -> bool {
        self.sender.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Copies `message` for a later [`publish`](Self::publish), but only when
    /// someone is listening. The original is handed to the pending waiter.
    pub fn capture(&self, message: &Message) -> Option<Message> {
        self.is_enabled().then(|| message.clone())
    }

    pub fn publish(&self, peer: SocketAddr, message: Message, matched: bool) {
        if let Some(tx) = &self.sender {
            if tx.send(ResponseEvent::new(peer, message, matched)).is_err() {
                trace!(peer = %peer, "Response event receiver is gone");
            }
        }
    }
}

impl std::fmt::Debug for ResponseEventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseEventEmitter")
            .field("listening", &self.is_enabled())
            .finish()
    }
}
