use serde::{Deserialize, Serialize};
use shared_types::{Address, ShardId, U256};

/// One share of the fees collected in a block.
///
/// The nonce is the round of the block, so shares of different blocks never
/// hash alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTransaction {
    pub nonce: u64,
    pub value: U256,
    pub receiver: Address,
    pub shard_id: ShardId,
}
