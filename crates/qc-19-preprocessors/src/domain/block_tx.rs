//! Pool categories handled by the block pre-processors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{BlockType, RewardTransaction, SmartContractResult, Transaction, UnitType};

/// Any transaction-like object referenced by a block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockTransaction {
    Transaction(Transaction),
    SmartContractResult(SmartContractResult),
    Reward(RewardTransaction),
}

/// A pooled object kind that lives in one block section and one storage unit.
pub trait BlockTxKind: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const BLOCK_TYPE: BlockType;
    const UNIT: UnitType;

    /// Gas reserved by the object; zero for gas-free kinds.
    fn gas_limit(&self) -> u64;

    fn into_block_tx(self) -> BlockTransaction;
}

impl BlockTxKind for Transaction {
    const BLOCK_TYPE: BlockType = BlockType::TxBlock;
    const UNIT: UnitType = UnitType::Transaction;

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn into_block_tx(self) -> BlockTransaction {
        BlockTransaction::Transaction(self)
    }
}

impl BlockTxKind for SmartContractResult {
    const BLOCK_TYPE: BlockType = BlockType::SmartContractResultBlock;
    const UNIT: UnitType = UnitType::UnsignedTransaction;

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    fn into_block_tx(self) -> BlockTransaction {
        BlockTransaction::SmartContractResult(self)
    }
}

impl BlockTxKind for RewardTransaction {
    const BLOCK_TYPE: BlockType = BlockType::RewardsBlock;
    const UNIT: UnitType = UnitType::RewardTransaction;

    fn gas_limit(&self) -> u64 {
        0
    }

    fn into_block_tx(self) -> BlockTransaction {
        BlockTransaction::Reward(self)
    }
}
