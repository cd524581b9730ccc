//! Factory of the pre-processors container.

use super::{require, PreProcessorsContainer};
use crate::domain::{Dependency, FactoryError};
use crate::ports::{
    BlockSizeComputationHandler, BlockTracker, GasHandler, PreProcessor, RequestHandler,
    RewardTransactionProcessor, SmartContractResultProcessor, TransactionProcessor,
};
use crate::preprocess::{
    ArgPreProcessor, RewardTxPreprocessor, SmartContractResultPreprocessor,
    TransactionPreprocessor, ValidatorInfoPreprocessor,
};
use shared_types::{
    AccountsAdapter, ChainStorer, FeeHandler, Hasher, Marshalizer, PoolsHolder, PubkeyConverter,
    ShardCoordinator,
};
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Default)]
pub struct PreProcessorsContainerFactoryArgs {
    pub shard_coordinator: Option<Arc<ShardCoordinator>>,
    pub store: Option<Arc<ChainStorer>>,
    pub marshalizer: Option<Marshalizer>,
    pub hasher: Option<Arc<dyn Hasher>>,
    pub data_pool: Option<PoolsHolder>,
    pub address_pubkey_converter: Option<Arc<dyn PubkeyConverter>>,
    pub accounts: Option<Arc<dyn AccountsAdapter>>,
    pub request_handler: Option<Arc<dyn RequestHandler>>,
    pub tx_processor: Option<Arc<dyn TransactionProcessor>>,
    pub scr_processor: Option<Arc<dyn SmartContractResultProcessor>>,
    pub reward_processor: Option<Arc<dyn RewardTransactionProcessor>>,
    pub fee_handler: Option<Arc<dyn FeeHandler>>,
    pub gas_handler: Option<Arc<dyn GasHandler>>,
    pub block_tracker: Option<Arc<dyn BlockTracker>>,
    pub block_size_computation: Option<Arc<dyn BlockSizeComputationHandler>>,
}

impl PreProcessorsContainerFactoryArgs {
    /// Checks every dependency in declaration order.
    pub fn resolve(self) -> Result<ArgPreProcessor, FactoryError> {
        Ok(ArgPreProcessor {
            shard_coordinator: require(self.shard_coordinator, Dependency::ShardCoordinator)?,
            store: require(self.store, Dependency::Store)?,
            marshalizer: require(self.marshalizer, Dependency::Marshalizer)?,
            hasher: require(self.hasher, Dependency::Hasher)?,
            data_pool: require(self.data_pool, Dependency::DataPool)?,
            address_pubkey_converter: require(
                self.address_pubkey_converter,
                Dependency::AddressPubkeyConverter,
            )?,
            accounts: require(self.accounts, Dependency::AccountsAdapter)?,
            request_handler: require(self.request_handler, Dependency::RequestHandler)?,
            tx_processor: require(self.tx_processor, Dependency::TxProcessor)?,
            scr_processor: require(self.scr_processor, Dependency::SmartContractResultProcessor)?,
            reward_processor: require(self.reward_processor, Dependency::RewardTxProcessor)?,
            fee_handler: require(self.fee_handler, Dependency::FeeHandler)?,
            gas_handler: require(self.gas_handler, Dependency::GasHandler)?,
            block_tracker: require(self.block_tracker, Dependency::BlockTracker)?,
            block_size_computation: require(
                self.block_size_computation,
                Dependency::BlockSizeComputation,
            )?,
        })
    }
}

#[derive(Clone)]
pub struct PreProcessorsContainerFactory {
    args: ArgPreProcessor,
}

impl PreProcessorsContainerFactory {
    pub fn new(args: PreProcessorsContainerFactoryArgs) -> Result<Self, FactoryError> {
        Ok(Self {
            args: args.resolve()?,
        })
    }

    /// Builds one pre-processor per block section.
    pub fn create(&self) -> Result<PreProcessorsContainer, FactoryError> {
        let preprocessors: [Arc<dyn PreProcessor>; 4] = [
            Arc::new(TransactionPreprocessor::new(&self.args)),
            Arc::new(SmartContractResultPreprocessor::new(&self.args)),
            Arc::new(RewardTxPreprocessor::new(&self.args)),
            Arc::new(ValidatorInfoPreprocessor::new(&self.args)),
        ];

        let mut container = PreProcessorsContainer::new();
        for preprocessor in preprocessors {
            container.add(preprocessor.block_type(), preprocessor)?;
        }

        info!(
            shard = self.args.shard_coordinator.self_id(),
            block_types = ?container.keys(),
            "pre-processors container created"
        );
        Ok(container)
    }
}
