//! Transport adapter boundary.
//!
//! A transport only moves frames. It never touches session state; everything
//! it observes comes back to the coordinator as a [`TransportEvent`].

use super::protocol::ClientMessage;
use derive_more::Display;
use tracing::{debug, instrument};

/// Errors raised when sending.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TransportError {
    /// No open connection.
    #[display("Not connected to game server")]
    NotConnected,
    /// The frame could not be written.
    #[display("Failed to send message: {}", _0)]
    Send(String),
}

impl std::error::Error for TransportError {}

/// Something that happened on the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Connection opened.
    Connected,
    /// Connection closed.
    Disconnected,
    /// A raw inbound frame, not yet decoded.
    Frame(String),
    /// Connection-level failure.
    Failed(String),
}

/// Outbound half of a message channel to the game server.
pub trait Transport {
    /// Sends a message. Does not wait for any reply.
    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Transport that records outbound messages and never replies.
///
/// Tests feed replies to the coordinator by hand.
#[derive(Debug, Default, Clone)]
pub struct MemoryTransport {
    sent: Vec<ClientMessage>,
    fail_sends: bool,
}

impl MemoryTransport {
    /// Creates a transport whose sends succeed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages sent so far, oldest first.
    pub fn sent(&self) -> &[ClientMessage] {
        &self.sent
    }

    /// Last message sent.
    pub fn last_sent(&self) -> Option<&ClientMessage> {
        self.sent.last()
    }

    /// Makes every following send fail with [`TransportError::NotConnected`].
    pub fn set_fail_sends(&mut self, fail: bool) {
        self.fail_sends = fail;
    }
}

impl Transport for MemoryTransport {
    #[instrument(skip(self))]
    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        if self.fail_sends {
            return Err(TransportError::NotConnected);
        }
        debug!(count = self.sent.len() + 1, "Recorded outbound message");
        self.sent.push(message.clone());
        Ok(())
    }
}
