//! # Core Domain Entities
//!
//! Wire entities exchanged between shards over gossip topics.
//!
//! ## Clusters
//!
//! - **Identity**: `Hash`, `Address`, `ShardId`, `NodeId`/`PeerId`
//! - **Transactions**: `Transaction`, `SmartContractResult`, `RewardTransaction`
//! - **Blocks**: `ShardHeader`, `MetaBlock`, `Header`, `MiniBlock`, `Body`
//! - **State**: `TrieNode`, `ValidatorInfo`
//! - **Transport**: `Batch`

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// A 32-byte content hash.
pub type Hash = [u8; 32];

/// A 32-byte account address (the account's public key).
pub type Address = [u8; 32];

/// Shard identifier.
pub type ShardId = u32;

/// Identifier reserved for the meta-chain.
pub const METACHAIN_SHARD_ID: ShardId = u32::MAX;

/// Unique identifier for a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

/// A peer identifier (alias for `NodeId` in peer contexts).
pub type PeerId = NodeId;

impl NodeId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form is enough to correlate log lines.
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

// =============================================================================
// CLUSTER B: TRANSACTIONS
// =============================================================================

/// A user transaction as gossiped on the `transactions` topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub nonce: u64,
    pub value: U256,
    pub receiver: Address,
    pub sender: Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: Vec<u8>,
    pub chain_id: Vec<u8>,
    pub version: u32,
    pub options: u32,
    pub signature: Vec<u8>,
}

/// Borrowed view of a transaction without its signature.
///
/// This is the payload the sender signs.
#[derive(Serialize)]
pub struct UnsignedTransactionView<'a> {
    pub nonce: u64,
    pub value: &'a U256,
    pub receiver: &'a Address,
    pub sender: &'a Address,
    pub gas_price: u64,
    pub gas_limit: u64,
    pub data: &'a [u8],
    pub chain_id: &'a [u8],
    pub version: u32,
    pub options: u32,
}

impl Transaction {
    /// Returns the signable view of this transaction.
    pub fn unsigned_view(&self) -> UnsignedTransactionView<'_> {
        UnsignedTransactionView {
            nonce: self.nonce,
            value: &self.value,
            receiver: &self.receiver,
            sender: &self.sender,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            data: &self.data,
            chain_id: &self.chain_id,
            version: self.version,
            options: self.options,
        }
    }
}

/// A result produced by smart-contract execution, routed cross-shard on the
/// `unsignedTransactions` topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartContractResult {
    pub nonce: u64,
    pub value: U256,
    pub receiver: Address,
    pub sender: Address,
    pub data: Vec<u8>,
    pub prev_tx_hash: Hash,
    pub original_tx_hash: Hash,
    pub gas_limit: u64,
    pub gas_price: u64,
}

/// A reward emitted by the meta-chain at epoch or round boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTransaction {
    pub round: u64,
    pub epoch: u32,
    pub value: U256,
    pub receiver: Address,
}

// =============================================================================
// CLUSTER C: BLOCKS
// =============================================================================

/// Kind of a mini-block, i.e. the block section it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BlockType {
    TxBlock,
    StateBlock,
    PeerBlock,
    SmartContractResultBlock,
    InvalidBlock,
    ReceiptBlock,
    RewardsBlock,
    TxFeeBlock,
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockType::TxBlock => "TxBlock",
            BlockType::StateBlock => "StateBlock",
            BlockType::PeerBlock => "PeerBlock",
            BlockType::SmartContractResultBlock => "SmartContractResultBlock",
            BlockType::InvalidBlock => "InvalidBlock",
            BlockType::ReceiptBlock => "ReceiptBlock",
            BlockType::RewardsBlock => "RewardsBlock",
            BlockType::TxFeeBlock => "TxFeeBlock",
        };
        f.write_str(name)
    }
}

/// A list of transaction hashes moving from one shard to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniBlock {
    pub tx_hashes: Vec<Hash>,
    pub receiver_shard_id: ShardId,
    pub sender_shard_id: ShardId,
    pub block_type: BlockType,
}

/// Block body: the mini-blocks referenced by a header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Body {
    pub mini_blocks: Vec<MiniBlock>,
}

/// Header-side summary of a mini-block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniBlockHeader {
    pub hash: Hash,
    pub sender_shard_id: ShardId,
    pub receiver_shard_id: ShardId,
    pub tx_count: u32,
    pub block_type: BlockType,
}

/// Summary of a shard block notarised by the meta-chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardData {
    pub shard_id: ShardId,
    pub header_hash: Hash,
    pub nonce: u64,
    pub round: u64,
    pub tx_count: u32,
}

/// Header of a shard block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardHeader {
    pub nonce: u64,
    pub round: u64,
    pub epoch: u32,
    pub shard_id: ShardId,
    pub timestamp: u64,
    pub prev_hash: Hash,
    pub prev_rand_seed: Vec<u8>,
    pub rand_seed: Vec<u8>,
    pub pub_keys_bitmap: Vec<u8>,
    pub root_hash: Hash,
    pub mini_block_headers: Vec<MiniBlockHeader>,
    pub meta_block_hashes: Vec<Hash>,
    pub chain_id: Vec<u8>,
    pub signature: Vec<u8>,
    pub leader_signature: Vec<u8>,
}

/// Header of a meta-chain block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaBlock {
    pub nonce: u64,
    pub round: u64,
    pub epoch: u32,
    pub timestamp: u64,
    pub prev_hash: Hash,
    pub prev_rand_seed: Vec<u8>,
    pub rand_seed: Vec<u8>,
    pub pub_keys_bitmap: Vec<u8>,
    pub root_hash: Hash,
    pub validator_stats_root_hash: Hash,
    pub shard_info: Vec<ShardData>,
    pub mini_block_headers: Vec<MiniBlockHeader>,
    pub chain_id: Vec<u8>,
    pub signature: Vec<u8>,
    pub leader_signature: Vec<u8>,
}

/// Either kind of block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Header {
    Shard(ShardHeader),
    Meta(MetaBlock),
}

macro_rules! header_field {
    ($(#[$doc:meta])* $name:ident: $ty:ty) => {
        $(#[$doc])*
        pub fn $name(&self) -> $ty {
            match self {
                Header::Shard(h) => &h.$name[..],
                Header::Meta(h) => &h.$name[..],
            }
        }
    };
}

impl Header {
    pub fn nonce(&self) -> u64 {
        match self {
            Header::Shard(h) => h.nonce,
            Header::Meta(h) => h.nonce,
        }
    }

    pub fn round(&self) -> u64 {
        match self {
            Header::Shard(h) => h.round,
            Header::Meta(h) => h.round,
        }
    }

    pub fn epoch(&self) -> u32 {
        match self {
            Header::Shard(h) => h.epoch,
            Header::Meta(h) => h.epoch,
        }
    }

    /// Shard the header was produced in; `METACHAIN_SHARD_ID` for meta blocks.
    pub fn shard_id(&self) -> ShardId {
        match self {
            Header::Shard(h) => h.shard_id,
            Header::Meta(_) => METACHAIN_SHARD_ID,
        }
    }

    header_field!(prev_rand_seed: &[u8]);
    header_field!(rand_seed: &[u8]);
    header_field!(pub_keys_bitmap: &[u8]);
    header_field!(chain_id: &[u8]);
    header_field!(signature: &[u8]);
    header_field!(leader_signature: &[u8]);
    header_field!(mini_block_headers: &[MiniBlockHeader]);

    /// Copy with the aggregated and leader signatures cleared.
    ///
    /// Signatures are computed over the hash of this copy.
    pub fn without_signatures(&self) -> Header {
        let mut copy = self.clone();
        match &mut copy {
            Header::Shard(h) => {
                h.signature.clear();
                h.leader_signature.clear();
            }
            Header::Meta(h) => {
                h.signature.clear();
                h.leader_signature.clear();
            }
        }
        copy
    }

    /// Copy with only the leader signature cleared.
    pub fn without_leader_signature(&self) -> Header {
        let mut copy = self.clone();
        match &mut copy {
            Header::Shard(h) => h.leader_signature.clear(),
            Header::Meta(h) => h.leader_signature.clear(),
        }
        copy
    }
}

// =============================================================================
// CLUSTER D: STATE
// =============================================================================

/// Number of children of a branch node.
pub const TRIE_BRANCH_WIDTH: usize = 16;

/// An encoded Patricia-Merkle trie node, synced over the trie-node topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrieNode {
    Leaf { key: Vec<u8>, value: Vec<u8> },
    Extension { key: Vec<u8>, child: Hash },
    Branch { children: Vec<Option<Hash>> },
}

/// Validator statistics carried by peer-block mini-blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub public_key: Vec<u8>,
    pub shard_id: ShardId,
    pub list: String,
    pub index: u32,
    pub rating: u32,
    pub leader_success: u32,
    pub validator_success: u32,
    pub accumulated_fees: U256,
}

// =============================================================================
// CLUSTER E: TRANSPORT
// =============================================================================

/// Envelope for topics that carry several objects per message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub data: Vec<Vec<u8>>,
}
