//! # Outbound Ports
//!
//! Execution engines, on-demand data requests and the block limits consulted
//! while assembling a block.

use crate::domain::PreprocessError;
use shared_types::{Address, Hash, RewardTransaction, ShardId, SmartContractResult, Transaction};

/// Fire-and-forget requests for objects missing from the pools.
pub trait RequestHandler: Send + Sync {
    fn request_transaction(&self, shard_id: ShardId, hashes: &[Hash]);

    fn request_unsigned_transactions(&self, shard_id: ShardId, hashes: &[Hash]);

    fn request_reward_transactions(&self, shard_id: ShardId, hashes: &[Hash]);
}

pub trait TransactionProcessor: Send + Sync {
    fn process_transaction(&self, tx: &Transaction) -> Result<(), PreprocessError>;
}

pub trait SmartContractResultProcessor: Send + Sync {
    fn process_smart_contract_result(&self, scr: &SmartContractResult)
        -> Result<(), PreprocessError>;
}

pub trait RewardTransactionProcessor: Send + Sync {
    fn process_reward_transaction(&self, reward: &RewardTransaction) -> Result<(), PreprocessError>;
}

/// Gas accounting for the block being built or processed.
pub trait GasHandler: Send + Sync {
    fn init(&self);

    fn set_gas_consumed(&self, gas: u64, hash: &Hash);

    fn gas_consumed(&self, hash: &Hash) -> u64;

    fn total_gas_consumed(&self) -> u64;

    fn remove_gas_consumed(&self, hashes: &[Hash]);
}

/// View on the notarisation progress of other shards.
pub trait BlockTracker: Send + Sync {
    /// True when `shard_id` fell too far behind to receive new transactions.
    fn is_shard_stuck(&self, shard_id: ShardId) -> bool;
}

/// Running estimate of the size of the block being built.
pub trait BlockSizeComputationHandler: Send + Sync {
    fn init(&self);

    fn add_num_mini_blocks(&self, count: usize);

    fn add_num_txs(&self, count: usize);

    fn is_max_block_size_reached(&self, num_new_mini_blocks: usize, num_new_txs: usize) -> bool;
}

/// Addresses and round data needed to split block fees.
pub trait SpecialAddressHandler: Send + Sync {
    fn leader_address(&self) -> Address;

    fn burn_address(&self) -> Address;

    /// Leader share of the fees, in percent. Values above 100 are capped.
    fn leader_fee_percentage(&self) -> u64;

    fn round(&self) -> u64;
}
