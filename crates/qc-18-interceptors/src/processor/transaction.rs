//! Processor for the transaction family.
//!
//! Transactions, results and rewards land in sharded pools partitioned by
//! the communication identifier of their sender and receiver shards.

use super::tx_validator::TxValidator;
use super::InterceptorProcessor;
use crate::domain::intercepted::hex_prefix;
use crate::domain::{InterceptedData, InterceptedTxHandler, ProcessorError, ValidatedData};
use shared_types::{
    communication_identifier_between, PeerId, RewardTransaction, ShardedDataPool,
    SmartContractResult, Transaction,
};
use std::sync::Arc;
use tracing::trace;

/// A pool value extracted from intercepted data.
pub trait PooledTransaction: Clone + Send + Sync + 'static {
    fn from_intercepted(data: &InterceptedData) -> Option<Self>;
}

impl PooledTransaction for Transaction {
    fn from_intercepted(data: &InterceptedData) -> Option<Self> {
        match data {
            InterceptedData::Transaction(tx) => Some(tx.transaction().clone()),
            _ => None,
        }
    }
}

impl PooledTransaction for SmartContractResult {
    fn from_intercepted(data: &InterceptedData) -> Option<Self> {
        match data {
            InterceptedData::SmartContractResult(scr) => Some(scr.result().clone()),
            _ => None,
        }
    }
}

impl PooledTransaction for RewardTransaction {
    fn from_intercepted(data: &InterceptedData) -> Option<Self> {
        match data {
            InterceptedData::RewardTransaction(reward) => Some(reward.reward().clone()),
            _ => None,
        }
    }
}

pub struct TxInterceptorProcessor<T> {
    pool: Arc<ShardedDataPool<T>>,
    validator: Arc<dyn TxValidator>,
}

impl<T: PooledTransaction> TxInterceptorProcessor<T> {
    pub fn new(pool: Arc<ShardedDataPool<T>>, validator: Arc<dyn TxValidator>) -> Self {
        Self { pool, validator }
    }

    fn handler(data: &ValidatedData) -> Result<&dyn InterceptedTxHandler, ProcessorError> {
        data.data()
            .tx_handler()
            .ok_or(ProcessorError::WrongDataType(data.data().type_name()))
    }
}

impl<T: PooledTransaction> InterceptorProcessor for TxInterceptorProcessor<T> {
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError> {
        let handler = Self::handler(data)?;
        self.validator.check_tx_validity(handler)
    }

    fn save(&self, data: &ValidatedData, from: &PeerId) -> Result<(), ProcessorError> {
        let handler = Self::handler(data)?;
        let value = T::from_intercepted(data.data())
            .ok_or(ProcessorError::WrongDataType(data.data().type_name()))?;
        let cache_id =
            communication_identifier_between(handler.sender_shard_id(), handler.receiver_shard_id());

        let added = self.pool.add_data(*data.hash(), value, &cache_id);
        trace!(
            hash = %hex_prefix(data.hash()),
            cache_id = %cache_id,
            peer = %from,
            added,
            "saved {}",
            data.data().type_name()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{validated_header, validated_transaction};
    use crate::processor::NilTxValidator;

    #[test]
    fn test_transaction_pooled_under_shard_pair() {
        let pool = Arc::new(ShardedDataPool::<Transaction>::new(100));
        let processor = TxInterceptorProcessor::new(pool.clone(), Arc::new(NilTxValidator));
        // Sender in shard 0, receiver in shard 1.
        let data = validated_transaction(0, 1);

        processor.validate(&data).unwrap();
        processor.save(&data, &PeerId::default()).unwrap();
        processor.save(&data, &PeerId::default()).unwrap();

        assert_eq!(pool.len(), 1);
        assert!(pool.shard_data_store("_0_1").unwrap().has(data.hash()));
    }

    #[test]
    fn test_wrong_data_type_rejected() {
        let pool = Arc::new(ShardedDataPool::<Transaction>::new(100));
        let processor = TxInterceptorProcessor::new(pool, Arc::new(NilTxValidator));
        let header = validated_header(0);
        assert_eq!(
            processor.validate(&header),
            Err(ProcessorError::WrongDataType("shard header"))
        );
    }

    #[test]
    fn test_pool_type_mismatch_rejected_on_save() {
        let pool = Arc::new(ShardedDataPool::<RewardTransaction>::new(100));
        let processor = TxInterceptorProcessor::new(pool.clone(), Arc::new(NilTxValidator));
        let data = validated_transaction(0, 0);
        assert!(processor.save(&data, &PeerId::default()).is_err());
        assert!(pool.is_empty());
    }
}
