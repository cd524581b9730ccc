//! # Outbound Ports
//!
//! Traits for external dependencies: transport, consensus membership,
//! signature primitives, block validity and epoch notifications.

use crate::domain::{CryptoError, DataError, MessengerError, ProcessorError};
use crate::ports::inbound::MessageProcessor;
use shared_types::{Hash, Header, PeerId, ShardId};
use std::sync::Arc;
use std::time::Duration;

/// Gossip transport.
pub trait Messenger: Send + Sync {
    fn has_topic(&self, topic: &str) -> bool;

    fn create_topic(&self, topic: &str, create_channel_for_topic: bool) -> Result<(), MessengerError>;

    /// Attaches `processor` to `topic`. Fails if a processor is already attached.
    fn register_message_processor(
        &self,
        topic: &str,
        processor: Arc<dyn MessageProcessor>,
    ) -> Result<(), MessengerError>;

    fn unregister_message_processor(&self, topic: &str) -> Result<(), MessengerError>;
}

/// Consensus group selection.
pub trait NodesCoordinator: Send + Sync {
    /// Public keys of the consensus group, leader first.
    fn compute_consensus_group(
        &self,
        randomness: &[u8],
        round: u64,
        shard_id: ShardId,
        epoch: u32,
    ) -> Result<Vec<Vec<u8>>, CryptoError>;
}

/// Public key validation for one signature scheme.
pub trait KeyGenerator: Send + Sync {
    fn check_public_key(&self, public_key: &[u8]) -> Result<(), CryptoError>;
}

/// Single-signature verification.
pub trait SingleSigner: Send + Sync {
    fn verify(&self, public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<(), CryptoError>;
}

/// Aggregated signature verification for consensus groups.
pub trait MultiSigVerifier: Send + Sync {
    /// Verifies `aggregated` over `message` for the signers in order.
    fn verify_aggregated(
        &self,
        public_keys: &[Vec<u8>],
        message: &[u8],
        aggregated: &[u8],
    ) -> Result<(), CryptoError>;
}

/// Header signature checks.
pub trait HeaderSigVerifier: Send + Sync {
    /// The random seed must be the leader's signature on the previous seed.
    fn verify_randomness(&self, header: &Header) -> Result<(), CryptoError>;

    fn verify_leader_signature(&self, header: &Header) -> Result<(), CryptoError>;

    /// Aggregated signature of the consensus group, quorum enforced.
    fn verify_signature(&self, header: &Header) -> Result<(), CryptoError>;
}

/// Temporal validity of headers relative to this node's view.
pub trait ValidityAttester: Send + Sync {
    fn check_block_against_rounder(&self, header: &Header) -> Result<(), DataError>;

    fn check_block_against_final(&self, header: &Header) -> Result<(), DataError>;
}

/// Nonce/finality checks applied before a header enters the pool.
pub trait HeaderValidator: Send + Sync {
    fn header_validate(&self, header: &Header, hash: &Hash) -> Result<(), ProcessorError>;
}

/// Receives epoch confirmations.
pub trait EpochConfirmedHandler: Send + Sync {
    fn epoch_confirmed(&self, epoch: u32);
}

/// Source of epoch confirmations.
pub trait EpochStartTrigger: Send + Sync {
    /// Registers `handler`; it immediately receives the current epoch.
    fn register_handler(&self, handler: Arc<dyn EpochConfirmedHandler>);

    fn epoch(&self) -> u32;
}

/// Hashes this node requested and will accept without the usual relevance
/// and signature checks.
pub trait WhiteListHandler: Send + Sync {
    fn is_white_listed(&self, hash: &Hash) -> bool;

    fn add(&self, hashes: &[Hash]);

    fn remove(&self, hashes: &[Hash]);
}

/// Identity that can be barred from processing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlacklistIdentity {
    Peer(PeerId),
    Topic(String),
    Hash(Hash),
}

impl std::fmt::Display for BlacklistIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlacklistIdentity::Peer(peer) => write!(f, "peer:{peer}"),
            BlacklistIdentity::Topic(topic) => write!(f, "topic:{topic}"),
            BlacklistIdentity::Hash(hash) => write!(f, "hash:{}", hex::encode(&hash[..8])),
        }
    }
}

/// Temporary ban list.
pub trait BlacklistHandler: Send + Sync {
    fn is_blacklisted(&self, identity: &BlacklistIdentity) -> bool;

    /// Bars `identity` for `duration`. Re-listing extends, never shortens.
    fn blacklist(&self, identity: BlacklistIdentity, duration: Duration);
}

/// Pre-decode admission by peer, topic and size.
pub trait AntifloodHandler: Send + Sync {
    fn can_process_message(&self, peer: &PeerId, topic: &str, size: usize) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_identity_display() {
        let mut hash = [0u8; 32];
        hash[..8].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01, 0x0a, 0xff]);
        assert_eq!(
            BlacklistIdentity::Hash(hash).to_string(),
            "hash:deadbeef00010aff"
        );
        assert_eq!(
            BlacklistIdentity::Topic("transactions_0".into()).to_string(),
            "topic:transactions_0"
        );
    }
}
