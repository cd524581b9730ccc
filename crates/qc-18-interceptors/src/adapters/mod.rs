//! # Adapters
//!
//! Concrete implementations of outbound ports:
//!
//! - `ed25519`: key checks, single and aggregated signature verification
//! - `header_sig`: consensus-group header signature verifier
//! - `epoch_notifier`: epoch-start trigger with handler fan-out
//! - `whitelist`: bounded whitelist of requested hashes

pub mod ed25519;
pub mod epoch_notifier;
pub mod header_sig;
pub mod whitelist;

pub use ed25519::{aggregate_signatures, Ed25519KeyPair, Ed25519Signer};
pub use epoch_notifier::EpochNotifier;
pub use header_sig::{bitmap_signers, consensus_quorum, ConsensusHeaderSigVerifier};
pub use whitelist::CacheWhiteList;
