//! Inbound ports (API) for block pre-processing.

use crate::domain::{BlockTransaction, PreprocessError};
use shared_types::{BlockType, Body, Hash, MiniBlock, SmartContractResult};
use std::collections::HashMap;
use std::time::Duration;

/// Pulls one block section's objects from the pools into a block.
///
/// Called by the block processor, once per block section.
pub trait PreProcessor: Send + Sync {
    fn block_type(&self) -> BlockType;

    /// Forgets the objects gathered for the previous block.
    fn create_block_started(&self);

    /// Collects the objects `body` references and requests the missing ones
    /// from peers. Returns how many were requested.
    fn request_block_transactions(&self, body: &Body) -> usize;

    /// Waits up to `timeout` for the `requested` objects to arrive.
    fn is_data_prepared(&self, requested: usize, timeout: Duration) -> Result<(), PreprocessError>;

    /// Executes the section's objects in block order.
    fn process_block_transactions(
        &self,
        body: &Body,
        have_time: &dyn Fn() -> bool,
    ) -> Result<(), PreprocessError>;

    fn save_tx_block_to_storage(&self, body: &Body) -> Result<(), PreprocessError>;

    fn remove_tx_block_from_pools(&self, body: &Body) -> Result<(), PreprocessError>;

    /// Builds this node's mini-blocks for a new block from pooled objects.
    fn create_and_process_mini_blocks(
        &self,
        have_time: &dyn Fn() -> bool,
    ) -> Result<Vec<MiniBlock>, PreprocessError>;

    /// Objects gathered for the current block, by hash.
    fn get_all_current_used_txs(&self) -> HashMap<Hash, BlockTransaction>;
}

/// Collects results produced while executing a block.
pub trait IntermediateProcessor: Send + Sync {
    fn block_type(&self) -> BlockType;

    fn create_block_started(&self);

    fn add_intermediate_transactions(
        &self,
        txs: Vec<SmartContractResult>,
    ) -> Result<(), PreprocessError>;

    /// Mini-blocks carrying the collected results, ordered by receiver shard.
    fn create_all_inter_mini_blocks(&self) -> Result<Vec<MiniBlock>, PreprocessError>;

    /// Checks the section of a received `body` against the local results.
    fn verify_inter_mini_blocks(&self, body: &Body) -> Result<(), PreprocessError>;

    fn save_current_intermediate_txs_to_storage(&self) -> Result<(), PreprocessError>;
}
