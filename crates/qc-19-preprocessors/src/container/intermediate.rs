//! Factory of the intermediate processors container.

use super::{require, IntermediateProcessorsContainer};
use crate::domain::{Dependency, FactoryError};
use crate::intermediate::{ArgIntermediateProcessor, IntermediateResultsProcessor, TxFeeCollector};
use crate::ports::{IntermediateProcessor, SpecialAddressHandler};
use shared_types::{ChainStorer, Hasher, Marshalizer, PubkeyConverter, ShardCoordinator};
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Default)]
pub struct IntermediateProcessorsContainerFactoryArgs {
    pub shard_coordinator: Option<Arc<ShardCoordinator>>,
    pub marshalizer: Option<Marshalizer>,
    pub hasher: Option<Arc<dyn Hasher>>,
    pub address_pubkey_converter: Option<Arc<dyn PubkeyConverter>>,
    pub special_address_handler: Option<Arc<dyn SpecialAddressHandler>>,
    pub store: Option<Arc<ChainStorer>>,
}

impl IntermediateProcessorsContainerFactoryArgs {
    pub fn resolve(self) -> Result<ArgIntermediateProcessor, FactoryError> {
        Ok(ArgIntermediateProcessor {
            shard_coordinator: require(self.shard_coordinator, Dependency::ShardCoordinator)?,
            marshalizer: require(self.marshalizer, Dependency::Marshalizer)?,
            hasher: require(self.hasher, Dependency::Hasher)?,
            address_pubkey_converter: require(
                self.address_pubkey_converter,
                Dependency::AddressPubkeyConverter,
            )?,
            special_address_handler: require(
                self.special_address_handler,
                Dependency::SpecialAddressHandler,
            )?,
            store: require(self.store, Dependency::Store)?,
        })
    }
}

#[derive(Clone)]
pub struct IntermediateProcessorsContainerFactory {
    args: ArgIntermediateProcessor,
}

impl IntermediateProcessorsContainerFactory {
    pub fn new(args: IntermediateProcessorsContainerFactoryArgs) -> Result<Self, FactoryError> {
        Ok(Self {
            args: args.resolve()?,
        })
    }

    pub fn create(&self) -> Result<IntermediateProcessorsContainer, FactoryError> {
        let processors: [Arc<dyn IntermediateProcessor>; 2] = [
            Arc::new(IntermediateResultsProcessor::new(&self.args)),
            Arc::new(TxFeeCollector::new(&self.args)),
        ];

        let mut container = IntermediateProcessorsContainer::new();
        for processor in processors {
            container.add(processor.block_type(), processor)?;
        }

        info!(
            shard = self.args.shard_coordinator.self_id(),
            block_types = ?container.keys(),
            "intermediate processors container created"
        );
        Ok(container)
    }
}
