//! # Block Pre-processors
//!
//! One pre-processor per block section:
//!
//! | Block type | Pre-processor | Pool |
//! |------------|---------------|------|
//! | `TxBlock` | `TransactionPreprocessor` | transactions |
//! | `SmartContractResultBlock` | `SmartContractResultPreprocessor` | unsigned transactions |
//! | `RewardsBlock` | `RewardTxPreprocessor` | reward transactions |
//! | `PeerBlock` | `ValidatorInfoPreprocessor` | validator infos |

mod base;
pub mod rewards;
pub mod smart_contract_results;
pub mod transactions;
pub mod validator_info;

pub use rewards::RewardTxPreprocessor;
pub use smart_contract_results::SmartContractResultPreprocessor;
pub use transactions::TransactionPreprocessor;
pub use validator_info::ValidatorInfoPreprocessor;

use crate::ports::{
    BlockSizeComputationHandler, BlockTracker, GasHandler, RequestHandler,
    RewardTransactionProcessor, SmartContractResultProcessor, TransactionProcessor,
};
use shared_types::{
    AccountsAdapter, ChainStorer, FeeHandler, Hasher, Marshalizer, PoolsHolder, PubkeyConverter,
    ShardCoordinator,
};
use std::sync::Arc;

/// Dependencies shared by the pre-processors, every one present.
#[derive(Clone)]
pub struct ArgPreProcessor {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub store: Arc<ChainStorer>,
    pub marshalizer: Marshalizer,
    pub hasher: Arc<dyn Hasher>,
    pub data_pool: PoolsHolder,
    pub address_pubkey_converter: Arc<dyn PubkeyConverter>,
    pub accounts: Arc<dyn AccountsAdapter>,
    pub request_handler: Arc<dyn RequestHandler>,
    pub tx_processor: Arc<dyn TransactionProcessor>,
    pub scr_processor: Arc<dyn SmartContractResultProcessor>,
    pub reward_processor: Arc<dyn RewardTransactionProcessor>,
    pub fee_handler: Arc<dyn FeeHandler>,
    pub gas_handler: Arc<dyn GasHandler>,
    pub block_tracker: Arc<dyn BlockTracker>,
    pub block_size_computation: Arc<dyn BlockSizeComputationHandler>,
}
