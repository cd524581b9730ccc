//! Smart-contract result pre-processor.
//!
//! Results are produced by execution in other shards; a block only ever
//! processes them, it never creates result mini-blocks from the pool.

use super::base::BasePreProcessor;
use super::ArgPreProcessor;
use crate::domain::{BlockTransaction, PreprocessError};
use crate::ports::{GasHandler, PreProcessor, SmartContractResultProcessor};
use shared_types::{BlockType, Body, Hash, MiniBlock, ShardId, SmartContractResult};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct SmartContractResultPreprocessor {
    base: BasePreProcessor<SmartContractResult>,
    scr_processor: Arc<dyn SmartContractResultProcessor>,
    gas_handler: Arc<dyn GasHandler>,
}

impl SmartContractResultPreprocessor {
    pub fn new(args: &ArgPreProcessor) -> Self {
        let request_handler = Arc::clone(&args.request_handler);
        let base = BasePreProcessor::new(
            Arc::clone(&args.data_pool.unsigned_transactions),
            Arc::clone(&args.store),
            args.marshalizer.clone(),
            Arc::clone(&args.hasher),
            Arc::new(move |shard_id: ShardId, hashes: &[Hash]| {
                request_handler.request_unsigned_transactions(shard_id, hashes)
            }),
        );
        Self {
            base,
            scr_processor: Arc::clone(&args.scr_processor),
            gas_handler: Arc::clone(&args.gas_handler),
        }
    }
}

impl PreProcessor for SmartContractResultPreprocessor {
    fn block_type(&self) -> BlockType {
        BlockType::SmartContractResultBlock
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
        for (hash, scr) in self.base.block_txs_in_order(body)? {
            if !have_time() {
                return Err(PreprocessError::TimeIsOut);
            }
            self.scr_processor.process_smart_contract_result(&scr)?;
            self.gas_handler.set_gas_consumed(scr.gas_limit, &hash);
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
