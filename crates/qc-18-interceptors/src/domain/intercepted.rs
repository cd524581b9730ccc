//! # Intercepted Data
//!
//! Decoded wire objects awaiting validation, and the validated wrapper the
//! processors accept.
//!
//! ```text
//! bytes ──factory.create──→ InterceptedData ──validate──→ ValidatedData ──→ processor
//! ```
//!
//! `ValidatedData` can only be produced by `InterceptedData::validate`, so a
//! processor can never be handed an object that skipped its checks.

use super::errors::DataError;
use super::header::InterceptedHeader;
use super::mini_block::InterceptedMiniBlock;
use super::results::{InterceptedRewardTransaction, InterceptedUnsignedTransaction};
use super::transaction::InterceptedTransaction;
use super::trie_node::InterceptedTrieNode;
use super::validator_info::InterceptedValidatorInfo;
use shared_types::{Address, Hash, ShardId, U256};
use std::fmt;

/// Behaviour shared by every intercepted category.
pub trait InterceptedObject: Send + Sync {
    /// Structural and cryptographic checks for the category.
    fn check_validity(&self) -> Result<(), DataError>;

    /// True when this node's shard needs the object.
    fn is_for_current_shard(&self) -> bool;

    /// Content hash, the pool key.
    fn hash(&self) -> &Hash;

    /// Bytes the object was decoded from.
    fn raw(&self) -> &[u8];

    /// Shard the object originates from.
    fn origin_shard(&self) -> ShardId;

    fn type_name(&self) -> &'static str;
}

/// Transaction-like objects routed through shard-pair pools.
pub trait InterceptedTxHandler {
    fn sender_shard_id(&self) -> ShardId;

    fn receiver_shard_id(&self) -> ShardId;

    fn nonce(&self) -> u64;

    fn sender_address(&self) -> &Address;

    fn fee(&self) -> U256;
}

/// A decoded, not yet validated, wire object.
pub enum InterceptedData {
    Header(InterceptedHeader),
    Transaction(InterceptedTransaction),
    SmartContractResult(InterceptedUnsignedTransaction),
    RewardTransaction(InterceptedRewardTransaction),
    TrieNode(InterceptedTrieNode),
    ValidatorInfo(InterceptedValidatorInfo),
    MiniBlock(InterceptedMiniBlock),
}

impl InterceptedData {
    pub fn object(&self) -> &dyn InterceptedObject {
        match self {
            InterceptedData::Header(d) => d,
            InterceptedData::Transaction(d) => d,
            InterceptedData::SmartContractResult(d) => d,
            InterceptedData::RewardTransaction(d) => d,
            InterceptedData::TrieNode(d) => d,
            InterceptedData::ValidatorInfo(d) => d,
            InterceptedData::MiniBlock(d) => d,
        }
    }

    /// Transaction view for the tx-family variants.
    pub fn tx_handler(&self) -> Option<&dyn InterceptedTxHandler> {
        match self {
            InterceptedData::Transaction(d) => Some(d),
            InterceptedData::SmartContractResult(d) => Some(d),
            InterceptedData::RewardTransaction(d) => Some(d),
            _ => None,
        }
    }

    pub fn hash(&self) -> &Hash {
        self.object().hash()
    }

    pub fn type_name(&self) -> &'static str {
        self.object().type_name()
    }

    pub fn is_for_current_shard(&self) -> bool {
        self.object().is_for_current_shard()
    }

    /// Runs the category checks, consuming the unvalidated object.
    pub fn validate(self) -> Result<ValidatedData, DataError> {
        self.object().check_validity()?;
        Ok(ValidatedData(self))
    }
}

impl fmt::Debug for InterceptedData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptedData")
            .field("type", &self.type_name())
            .field("hash", &hex_prefix(self.hash()))
            .finish()
    }
}

/// Intercepted data that passed its category checks.
#[derive(Debug)]
pub struct ValidatedData(InterceptedData);

impl ValidatedData {
    pub fn data(&self) -> &InterceptedData {
        &self.0
    }

    pub fn hash(&self) -> &Hash {
        self.0.hash()
    }

    pub fn is_for_current_shard(&self) -> bool {
        self.0.is_for_current_shard()
    }

    pub fn into_inner(self) -> InterceptedData {
        self.0
    }
}

pub(crate) fn hex_prefix(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_prefix_is_first_eight_bytes() {
        let mut hash = [0xffu8; 32];
        hash[0] = 0x01;
        assert_eq!(hex_prefix(&hash), "01ffffffffffffff");
    }
}
