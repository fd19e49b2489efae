use dnswire_domain::config::TransportConfig;
use dnswire_domain::{DomainError, Message};
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use super::scratch_pool::ScratchPool;
use crate::dns::wire::{MessageWriter, MAXMSG};

/// A message bound for one peer, with the size budget it must fit in.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    message: Message,
    peer: SocketAddr,
    max_send: usize,
    compression_entries: usize,
}

impl OutgoingMessage {
    pub fn new(message: Message, peer: SocketAddr, config: &TransportConfig) -> Self {
        Self {
            message,
            peer,
            max_send: config.max_send.min(MAXMSG),
            compression_entries: config.compression_entries,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn max_send(&self) -> usize {
        self.max_send
    }

    /// Raises or lowers the datagram budget; anything over 65535 is refused.
    pub fn set_max_send(&mut self, max_send: usize) -> Result<(), DomainError> {
        if max_send > MAXMSG {
            return Err(DomainError::MessageTooLarge(max_send));
        }
        self.max_send = max_send;
        Ok(())
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// Encodes `message` under this budget and sends it to the peer.
    pub(crate) async fn transmit(
        &self,
        socket: &UdpSocket,
        pool: &ScratchPool,
        message: &Message,
    ) -> Result<SendOutcome, DomainError> {
        let mut scratch = pool.checkout();
        let mut writer =
            MessageWriter::with_compression_entries(&mut scratch, self.max_send, self.compression_entries);
        let len = writer.write_message(message)?;
        let truncated = writer.is_truncated();
        drop(writer);

        if len == 0 {
            warn!(peer = %self.peer, max_send = self.max_send, "Budget too small for a header, nothing sent");
            return Ok(SendOutcome {
                bytes: 0,
                truncated,
            });
        }

        let sent = socket.send_to(&scratch[..len], self.peer).await?;
        debug!(
            peer = %self.peer,
            id = message.header.id,
            bytes = sent,
            truncated,
            "Sent DNS message"
        );

        Ok(SendOutcome {
            bytes: sent,
            truncated,
        })
    }
}

impl Deref for OutgoingMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

impl DerefMut for OutgoingMessage {
    fn deref_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}

/// What a send actually put on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    pub bytes: usize,
    pub truncated: bool,
}
