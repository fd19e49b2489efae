use dnswire_domain::Message;
use std::net::SocketAddr;
use std::time::Instant;

/// A decoded response as seen by the client receive loop.
#[derive(Debug, Clone)]
pub struct ResponseEvent {
    pub peer: SocketAddr,

    pub message: Message,

    /// Whether a pending request claimed this response.
    pub matched: bool,

    pub received_at: Instant,
}

impl ResponseEvent {
    pub fn new(peer: SocketAddr, message: Message, matched: bool) -> Self {
        Self {
            peer,
            message,
            matched,
            received_at: Instant::now(),
        }
    }

    pub fn id(&self) -> u16 {
        self.message.header.id
    }

    pub fn is_unsolicited(&self) -> bool {
        !self.matched
    }
}
