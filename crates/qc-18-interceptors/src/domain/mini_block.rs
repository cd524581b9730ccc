//! Intercepted mini-blocks.

use super::errors::DataError;
use super::intercepted::InterceptedObject;
use shared_types::{Hash, MiniBlock, ShardCoordinator, ShardId, METACHAIN_SHARD_ID};
use std::sync::Arc;

pub struct InterceptedMiniBlock {
    mini_block: MiniBlock,
    raw: Vec<u8>,
    hash: Hash,
    shard_coordinator: Arc<ShardCoordinator>,
}

impl InterceptedMiniBlock {
    pub fn new(
        mini_block: MiniBlock,
        raw: Vec<u8>,
        hash: Hash,
        shard_coordinator: Arc<ShardCoordinator>,
    ) -> Self {
        Self {
            mini_block,
            raw,
            hash,
            shard_coordinator,
        }
    }

    pub fn mini_block(&self) -> &MiniBlock {
        &self.mini_block
    }

    fn check_shard(&self, shard_id: ShardId) -> Result<(), DataError> {
        if shard_id != METACHAIN_SHARD_ID && shard_id >= self.shard_coordinator.number_of_shards() {
            return Err(DataError::InvalidShardId(shard_id));
        }
        Ok(())
    }
}

impl InterceptedObject for InterceptedMiniBlock {
    fn check_validity(&self) -> Result<(), DataError> {
        self.check_shard(self.mini_block.sender_shard_id)?;
        self.check_shard(self.mini_block.receiver_shard_id)?;
        if self.mini_block.tx_hashes.is_empty() {
            return Err(DataError::MissingField("tx_hashes"));
        }
        Ok(())
    }

    fn is_for_current_shard(&self) -> bool {
        let self_id = self.shard_coordinator.self_id();
        self.mini_block.receiver_shard_id == self_id || self.mini_block.sender_shard_id == self_id
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn origin_shard(&self) -> ShardId {
        self.mini_block.sender_shard_id
    }

    fn type_name(&self) -> &'static str {
        "mini block"
    }
}
