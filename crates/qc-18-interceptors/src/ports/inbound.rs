//! Inbound ports (API) for the Interceptors subsystem.

use crate::domain::InterceptorError;
use shared_types::PeerId;

/// A gossip message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct P2pMessage {
    /// Topic the message arrived on.
    pub topic: String,
    /// Raw payload.
    pub data: Vec<u8>,
    /// Peer the message was received from.
    pub peer: PeerId,
}

impl P2pMessage {
    pub fn new(topic: impl Into<String>, data: Vec<u8>, peer: PeerId) -> Self {
        Self {
            topic: topic.into(),
            data,
            peer,
        }
    }
}

/// Handler attached to a gossip topic.
///
/// The transport calls this concurrently, one call per inbound message.
/// Errors are informational: the transport drops the message and carries on.
pub trait MessageProcessor: Send + Sync {
    fn process_received_message(&self, message: &P2pMessage) -> Result<(), InterceptorError>;
}
