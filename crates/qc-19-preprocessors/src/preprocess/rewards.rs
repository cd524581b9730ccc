//! Reward transaction pre-processor.
//!
//! Rewards originate on the meta-chain, so their mini-blocks always come
//! from `METACHAIN_SHARD_ID` and missing rewards are requested from it.

use super::base::BasePreProcessor;
use super::ArgPreProcessor;
use crate::domain::{BlockTransaction, PreprocessError};
use crate::ports::{PreProcessor, RewardTransactionProcessor};
use shared_types::{BlockType, Body, Hash, MiniBlock, RewardTransaction, ShardId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct RewardTxPreprocessor {
    base: BasePreProcessor<RewardTransaction>,
    reward_processor: Arc<dyn RewardTransactionProcessor>,
}

impl RewardTxPreprocessor {
    pub fn new(args: &ArgPreProcessor) -> Self {
        let request_handler = Arc::clone(&args.request_handler);
        let base = BasePreProcessor::new(
            Arc::clone(&args.data_pool.reward_transactions),
            Arc::clone(&args.store),
            args.marshalizer.clone(),
            Arc::clone(&args.hasher),
            Arc::new(move |shard_id: ShardId, hashes: &[Hash]| {
                request_handler.request_reward_transactions(shard_id, hashes)
            }),
        );
        Self {
            base,
            reward_processor: Arc::clone(&args.reward_processor),
        }
    }
}

impl PreProcessor for RewardTxPreprocessor {
    fn block_type(&self) -> BlockType {
        BlockType::RewardsBlock
    }

    fn create_block_started(&self) {
        self.base.create_block_started();
    }

    fn request_block_transactions(&self, body: &Body) -> usize {
        self.base.request_block_transactions(body)
    }

    fn is_data_prepared(&self, requested: usize, timeout: Duration) -> Result<(), PreprocessError> {
        self.base.is_data_prepared(requested, timeout)
    }

    fn process_block_transactions(
        &self,
        body: &Body,
        have_time: &dyn Fn() -> bool,
    ) -> Result<(), PreprocessError> {
        for (_, reward) in self.base.block_txs_in_order(body)? {
            if !have_time() {
                return Err(PreprocessError::TimeIsOut);
            }
            self.reward_processor.process_reward_transaction(&reward)?;
        }
        Ok(())
    }

    fn save_tx_block_to_storage(&self, body: &Body) -> Result<(), PreprocessError> {
        self.base.save_tx_block_to_storage(body)
    }

    fn remove_tx_block_from_pools(&self, body: &Body) -> Result<(), PreprocessError> {
        self.base.remove_tx_block_from_pools(body);
        Ok(())
    }

    fn create_and_process_mini_blocks(
        &self,
        _have_time: &dyn Fn() -> bool,
    ) -> Result<Vec<MiniBlock>, PreprocessError> {
        Ok(Vec::new())
    }

    fn get_all_current_used_txs(&self) -> HashMap<Hash, BlockTransaction> {
        self.base.get_all_current_used_txs()
    }
}
