//! # Consensus Header Signature Verifier
//!
//! Checks header signatures against the consensus group selected by the
//! nodes coordinator for the header's round.
//!
//! - the leader (first group member) signs the previous random seed; the
//!   signature is the new random seed
//! - the leader signs the header hash with the leader signature cleared
//! - at least 2/3+1 of the group, marked in the bitmap, co-sign the header
//!   hash with both signatures cleared

use crate::domain::CryptoError;
use crate::ports::{HeaderSigVerifier, MultiSigVerifier, NodesCoordinator, SingleSigner};
use shared_types::{Hash, Hasher, Header, Marshalizer};
use std::sync::Arc;

pub struct ConsensusHeaderSigVerifier {
    nodes_coordinator: Arc<dyn NodesCoordinator>,
    multi_sig: Arc<dyn MultiSigVerifier>,
    single_signer: Arc<dyn SingleSigner>,
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
}

impl ConsensusHeaderSigVerifier {
    pub fn new(
        nodes_coordinator: Arc<dyn NodesCoordinator>,
        multi_sig: Arc<dyn MultiSigVerifier>,
        single_signer: Arc<dyn SingleSigner>,
        marshalizer: Marshalizer,
        hasher: Arc<dyn Hasher>,
    ) -> Self {
        Self {
            nodes_coordinator,
            multi_sig,
            single_signer,
            marshalizer,
            hasher,
        }
    }

    fn consensus_group(&self, header: &Header) -> Result<Vec<Vec<u8>>, CryptoError> {
        let group = self.nodes_coordinator.compute_consensus_group(
            header.prev_rand_seed(),
            header.round(),
            header.shard_id(),
            header.epoch(),
        )?;
        if group.is_empty() {
            return Err(CryptoError::EmptyConsensusGroup);
        }
        Ok(group)
    }

    fn leader(&self, header: &Header) -> Result<Vec<u8>, CryptoError> {
        self.consensus_group(header)?
            .into_iter()
            .next()
            .ok_or(CryptoError::EmptyConsensusGroup)
    }

    fn signed_hash(&self, header: &Header) -> Result<Hash, CryptoError> {
        let bytes = self
            .marshalizer
            .marshal(header)
            .map_err(|e| CryptoError::Payload(e.to_string()))?;
        Ok(self.hasher.compute(&bytes))
    }
}

/// Minimum number of co-signers for a group of `size`.
pub fn consensus_quorum(size: usize) -> usize {
    size * 2 / 3 + 1
}

/// Group members whose bit is set, in group order.
pub fn bitmap_signers<'a>(
    group: &'a [Vec<u8>],
    bitmap: &[u8],
) -> Result<Vec<&'a Vec<u8>>, CryptoError> {
    let needed = group.len().div_ceil(8);
    if bitmap.len() < needed {
        return Err(CryptoError::InvalidBitmap(format!(
            "{} bytes for a group of {}",
            bitmap.len(),
            group.len()
        )));
    }
    Ok(group
        .iter()
        .enumerate()
        .filter(|(i, _)| bitmap[i / 8] & (1 << (i % 8)) != 0)
        .map(|(_, key)| key)
        .collect())
}

impl HeaderSigVerifier for ConsensusHeaderSigVerifier {
    fn verify_randomness(&self, header: &Header) -> Result<(), CryptoError> {
        let leader = self.leader(header)?;
        self.single_signer
            .verify(&leader, header.prev_rand_seed(), header.rand_seed())
    }

    fn verify_leader_signature(&self, header: &Header) -> Result<(), CryptoError> {
        let leader = self.leader(header)?;
        let hash = self.signed_hash(&header.without_leader_signature())?;
        self.single_signer
            .verify(&leader, &hash, header.leader_signature())
    }

    fn verify_signature(&self, header: &Header) -> Result<(), CryptoError> {
        let group = self.consensus_group(header)?;
        let signers = bitmap_signers(&group, header.pub_keys_bitmap())?;
        let required = consensus_quorum(group.len());
        if signers.len() < required {
            return Err(CryptoError::NotEnoughSignatures {
                signed: signers.len(),
                required,
            });
        }
        let hash = self.signed_hash(&header.without_signatures())?;
        let signers: Vec<Vec<u8>> = signers.into_iter().cloned().collect();
        self.multi_sig
            .verify_aggregated(&signers, &hash, header.signature())
    }
}
