//! # Block-Type Containers
//!
//! Immutable registries mapping block type → processor, built once by a
//! container factory and then shared read-only with the block processor.
//!
//! - `PreProcessorsContainerFactory`: the four block pre-processors
//! - `IntermediateProcessorsContainerFactory`: result and fee collectors

pub mod intermediate;
pub mod preprocessors;

pub use intermediate::{
    IntermediateProcessorsContainerFactory, IntermediateProcessorsContainerFactoryArgs,
};
pub use preprocessors::{PreProcessorsContainerFactory, PreProcessorsContainerFactoryArgs};

use crate::domain::{Dependency, FactoryError};
use crate::ports::{IntermediateProcessor, PreProcessor};
use shared_types::{BlockType, ContainerError, KeyedContainer};
use std::fmt;
use std::sync::Arc;

/// Block type → processor registry.
pub struct BlockTypeContainer<P: ?Sized> {
    inner: KeyedContainer<BlockType, Arc<P>>,
}

pub type PreProcessorsContainer = BlockTypeContainer<dyn PreProcessor>;
pub type IntermediateProcessorsContainer = BlockTypeContainer<dyn IntermediateProcessor>;

impl<P: ?Sized> BlockTypeContainer<P> {
    pub fn new() -> Self {
        Self {
            inner: KeyedContainer::new(),
        }
    }

    /// Fails on a duplicate block type; the first processor stays.
    pub fn add(&mut self, block_type: BlockType, processor: Arc<P>) -> Result<(), ContainerError> {
        self.inner.add(block_type, processor)
    }

    pub fn get(&self, block_type: BlockType) -> Result<&Arc<P>, ContainerError> {
        self.inner.get(&block_type)
    }

    /// Block types in insertion order.
    pub fn keys(&self) -> &[BlockType] {
        self.inner.keys()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<P: ?Sized> Default for BlockTypeContainer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ?Sized> fmt::Debug for BlockTypeContainer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockTypeContainer")
            .field("keys", &self.keys())
            .finish()
    }
}

pub(crate) fn require<T>(value: Option<T>, dependency: Dependency) -> Result<T, FactoryError> {
    value.ok_or(FactoryError::MissingDependency(dependency))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intermediate::{IntermediateResultsProcessor, TxFeeCollector};
    use crate::mocks::test_intermediate_args;

    #[test]
    fn test_duplicate_block_type_keeps_first() {
        let args = test_intermediate_args(2, 0);
        let first: Arc<dyn IntermediateProcessor> =
            Arc::new(IntermediateResultsProcessor::new(&args));
        let second: Arc<dyn IntermediateProcessor> = Arc::new(TxFeeCollector::new(&args));

        let mut container = IntermediateProcessorsContainer::new();
        container
            .add(BlockType::SmartContractResultBlock, first.clone())
            .unwrap();
        assert!(matches!(
            container.add(BlockType::SmartContractResultBlock, second),
            Err(ContainerError::ItemAlreadyExists { .. })
        ));
        assert_eq!(container.len(), 1);
        assert!(Arc::ptr_eq(
            container.get(BlockType::SmartContractResultBlock).unwrap(),
            &first
        ));
    }

    #[test]
    fn test_unknown_block_type() {
        let container = PreProcessorsContainer::new();
        assert!(container.is_empty());
        assert!(matches!(
            container.get(BlockType::TxBlock),
            Err(ContainerError::InvalidKey { .. })
        ));
    }
}
