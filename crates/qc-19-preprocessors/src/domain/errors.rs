//! Block pre-processing error types.

use shared_types::{BlockType, CodecError, ContainerError, Hash, ShardId, StorageError};
use std::fmt;
use thiserror::Error;

/// Every injectable dependency of the pre-processing containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    ShardCoordinator,
    Store,
    Marshalizer,
    Hasher,
    DataPool,
    AddressPubkeyConverter,
    AccountsAdapter,
    RequestHandler,
    TxProcessor,
    SmartContractResultProcessor,
    RewardTxProcessor,
    FeeHandler,
    GasHandler,
    BlockTracker,
    BlockSizeComputation,
    SpecialAddressHandler,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors raised while building pre-processor containers.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Missing dependency: {0}")]
    MissingDependency(Dependency),

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),
}

/// Errors raised while assembling or verifying a block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreprocessError {
    #[error("Time is out")]
    TimeIsOut,

    #[error("Block data not prepared: {missing} transactions still missing")]
    DataNotPrepared { missing: usize },

    #[error("Missing transaction: {}", hex::encode(&.0[..4]))]
    MissingTransaction(Hash),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Invalid address length: expected {expected}, got {actual}")]
    InvalidAddress { expected: usize, actual: usize },

    #[error("Mini block to shard {receiver} does not match the locally created one")]
    MiniBlockMismatch { receiver: ShardId },

    #[error("{block_type} mini block count mismatch: expected {expected}, received {received}")]
    MiniBlockCountMismatch {
        block_type: BlockType,
        expected: usize,
        received: usize,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_transaction_display() {
        let err = PreprocessError::MissingTransaction([0x0f; 32]);
        assert_eq!(err.to_string(), "Missing transaction: 0f0f0f0f");
    }

    #[test]
    fn test_missing_dependency_names_dependency() {
        let err = FactoryError::MissingDependency(Dependency::BlockTracker);
        assert_eq!(err.to_string(), "Missing dependency: BlockTracker");
    }
}
