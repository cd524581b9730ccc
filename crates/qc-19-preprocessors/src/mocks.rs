//! # Test Doubles
//!
//! Stub execution engines, a recording request handler and builders for
//! fully populated argument bundles. Enabled for unit tests and with the
//! `test-utils` feature.

use crate::adapters::{BlockSizeComputation, GasTracker};
use crate::container::{
    IntermediateProcessorsContainerFactoryArgs, PreProcessorsContainerFactoryArgs,
};
use crate::domain::PreprocessError;
use crate::intermediate::ArgIntermediateProcessor;
use crate::ports::{
    BlockTracker, RequestHandler, RewardTransactionProcessor, SmartContractResultProcessor,
    SpecialAddressHandler, TransactionProcessor,
};
use crate::preprocess::ArgPreProcessor;
use parking_lot::Mutex;
use shared_types::{
    calculate_hash, communication_identifier_between, Address, BlockType, Body, ChainStorer,
    EconomicsData, Hash, HexPubkeyConverter, InMemoryAccounts, Marshalizer, MiniBlock,
    PoolsHolder, RewardTransaction, Sha256Hasher, ShardCoordinator, ShardId, SmartContractResult,
    Transaction, METACHAIN_SHARD_ID, U256,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Gas limit of every pooled test transaction.
pub const TEST_GAS_LIMIT: u64 = 50_000;

// =============================================================================
// REQUESTS
// =============================================================================

type Requests = Mutex<Vec<(ShardId, Vec<Hash>)>>;

/// Request handler remembering every call.
#[derive(Default)]
pub struct RecordingRequestHandler {
    transactions: Requests,
    unsigned: Requests,
    rewards: Requests,
}

impl RecordingRequestHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transaction_requests(&self) -> Vec<(ShardId, Vec<Hash>)> {
        self.transactions.lock().clone()
    }

    pub fn unsigned_requests(&self) -> Vec<(ShardId, Vec<Hash>)> {
        self.unsigned.lock().clone()
    }

    pub fn reward_requests(&self) -> Vec<(ShardId, Vec<Hash>)> {
        self.rewards.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.lock().is_empty()
            && self.unsigned.lock().is_empty()
            && self.rewards.lock().is_empty()
    }
}

impl RequestHandler for RecordingRequestHandler {
    fn request_transaction(&self, shard_id: ShardId, hashes: &[Hash]) {
        self.transactions.lock().push((shard_id, hashes.to_vec()));
    }

    fn request_unsigned_transactions(&self, shard_id: ShardId, hashes: &[Hash]) {
        self.unsigned.lock().push((shard_id, hashes.to_vec()));
    }

    fn request_reward_transactions(&self, shard_id: ShardId, hashes: &[Hash]) {
        self.rewards.lock().push((shard_id, hashes.to_vec()));
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

macro_rules! mock_processor {
    ($name:ident, $port:ident, $method:ident, $item:ty) => {
        /// Accepts everything unless built with `failing`.
        #[derive(Default)]
        pub struct $name {
            fail: bool,
            processed: Mutex<usize>,
        }

        impl $name {
            pub fn failing() -> Self {
                Self {
                    fail: true,
                    processed: Mutex::new(0),
                }
            }

            pub fn processed(&self) -> usize {
                *self.processed.lock()
            }
        }

        impl $port for $name {
            fn $method(&self, _item: &$item) -> Result<(), PreprocessError> {
                if self.fail {
                    return Err(PreprocessError::Execution(
                        concat!(stringify!($name), " configured to fail").to_string(),
                    ));
                }
                *self.processed.lock() += 1;
                Ok(())
            }
        }
    };
}

mock_processor!(MockTxProcessor, TransactionProcessor, process_transaction, Transaction);
mock_processor!(
    MockScrProcessor,
    SmartContractResultProcessor,
    process_smart_contract_result,
    SmartContractResult
);
mock_processor!(
    MockRewardProcessor,
    RewardTransactionProcessor,
    process_reward_transaction,
    RewardTransaction
);

/// Block tracker reporting a fixed set of shards as stuck.
#[derive(Default)]
pub struct MockBlockTracker {
    stuck: HashSet<ShardId>,
}

impl MockBlockTracker {
    pub fn stuck(shards: Vec<ShardId>) -> Self {
        Self {
            stuck: shards.into_iter().collect(),
        }
    }
}

impl BlockTracker for MockBlockTracker {
    fn is_shard_stuck(&self, shard_id: ShardId) -> bool {
        self.stuck.contains(&shard_id)
    }
}

/// Fixed leader and burn addresses for one round.
pub struct MockSpecialAddressHandler {
    leader_fee_percentage: u64,
}

impl MockSpecialAddressHandler {
    pub const LEADER: Address = [0x1e; 32];
    pub const BURN: Address = [0xbb; 32];
    pub const ROUND: u64 = 42;

    pub fn new(leader_fee_percentage: u64) -> Self {
        Self {
            leader_fee_percentage,
        }
    }
}

impl Default for MockSpecialAddressHandler {
    fn default() -> Self {
        Self::new(40)
    }
}

impl SpecialAddressHandler for MockSpecialAddressHandler {
    fn leader_address(&self) -> Address {
        Self::LEADER
    }

    fn burn_address(&self) -> Address {
        Self::BURN
    }

    fn leader_fee_percentage(&self) -> u64 {
        self.leader_fee_percentage
    }

    fn round(&self) -> u64 {
        Self::ROUND
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Address owned by `shard` under a coordinator with up to 256 shards.
pub fn address_in_shard(fill: u8, shard: ShardId) -> Address {
    let mut address = [fill; 32];
    address[31] = shard as u8;
    address
}

/// Pre-processor arguments over empty pools and an in-memory store, with
/// accept-all engines and no accounts.
pub fn test_preprocessor_args(
    shards: u32,
    self_id: ShardId,
) -> (ArgPreProcessor, Arc<RecordingRequestHandler>) {
    let requests = Arc::new(RecordingRequestHandler::new());
    let args = ArgPreProcessor {
        shard_coordinator: Arc::new(
            ShardCoordinator::new(shards, self_id).expect("valid test coordinator"),
        ),
        store: Arc::new(ChainStorer::in_memory()),
        marshalizer: Marshalizer::bincode(),
        hasher: Arc::new(Sha256Hasher),
        data_pool: PoolsHolder::default(),
        address_pubkey_converter: Arc::new(HexPubkeyConverter::default()),
        accounts: Arc::new(InMemoryAccounts::new()),
        request_handler: requests.clone(),
        tx_processor: Arc::new(MockTxProcessor::default()),
        scr_processor: Arc::new(MockScrProcessor::default()),
        reward_processor: Arc::new(MockRewardProcessor::default()),
        fee_handler: Arc::new(EconomicsData::default()),
        gas_handler: Arc::new(GasTracker::new()),
        block_tracker: Arc::new(MockBlockTracker::default()),
        block_size_computation: Arc::new(BlockSizeComputation::default()),
    };
    (args, requests)
}

pub fn test_preprocessors_container_args(
    shards: u32,
    self_id: ShardId,
) -> PreProcessorsContainerFactoryArgs {
    let (args, _) = test_preprocessor_args(shards, self_id);
    PreProcessorsContainerFactoryArgs {
        shard_coordinator: Some(args.shard_coordinator),
        store: Some(args.store),
        marshalizer: Some(args.marshalizer),
        hasher: Some(args.hasher),
        data_pool: Some(args.data_pool),
        address_pubkey_converter: Some(args.address_pubkey_converter),
        accounts: Some(args.accounts),
        request_handler: Some(args.request_handler),
        tx_processor: Some(args.tx_processor),
        scr_processor: Some(args.scr_processor),
        reward_processor: Some(args.reward_processor),
        fee_handler: Some(args.fee_handler),
        gas_handler: Some(args.gas_handler),
        block_tracker: Some(args.block_tracker),
        block_size_computation: Some(args.block_size_computation),
    }
}

pub fn test_intermediate_args(shards: u32, self_id: ShardId) -> ArgIntermediateProcessor {
    ArgIntermediateProcessor {
        shard_coordinator: Arc::new(
            ShardCoordinator::new(shards, self_id).expect("valid test coordinator"),
        ),
        marshalizer: Marshalizer::bincode(),
        hasher: Arc::new(Sha256Hasher),
        address_pubkey_converter: Arc::new(HexPubkeyConverter::default()),
        special_address_handler: Arc::new(MockSpecialAddressHandler::default()),
        store: Arc::new(ChainStorer::in_memory()),
    }
}

pub fn test_intermediate_container_args(
    shards: u32,
    self_id: ShardId,
) -> IntermediateProcessorsContainerFactoryArgs {
    let args = test_intermediate_args(shards, self_id);
    IntermediateProcessorsContainerFactoryArgs {
        shard_coordinator: Some(args.shard_coordinator),
        marshalizer: Some(args.marshalizer),
        hasher: Some(args.hasher),
        address_pubkey_converter: Some(args.address_pubkey_converter),
        special_address_handler: Some(args.special_address_handler),
        store: Some(args.store),
    }
}

/// Body with one mini-block of `block_type`.
pub fn body_of(
    block_type: BlockType,
    sender: ShardId,
    receiver: ShardId,
    tx_hashes: Vec<Hash>,
) -> Body {
    Body {
        mini_blocks: vec![MiniBlock {
            tx_hashes,
            sender_shard_id: sender,
            receiver_shard_id: receiver,
            block_type,
        }],
    }
}

fn hash_of<T: serde::Serialize>(args: &ArgPreProcessor, value: &T) -> Hash {
    calculate_hash(&args.marshalizer, args.hasher.as_ref(), value).expect("hashable test value")
}

/// Adds a transaction from the fixed sender of `sender_shard` to the pool
/// partition between both shards.
pub fn pooled_transaction(
    args: &ArgPreProcessor,
    sender_shard: ShardId,
    receiver_shard: ShardId,
    nonce: u64,
) -> (Transaction, Hash) {
    let tx = Transaction {
        nonce,
        value: U256::from(10u64),
        receiver: address_in_shard(0x22, receiver_shard),
        sender: address_in_shard(0x11, sender_shard),
        gas_price: 1_000_000_000,
        gas_limit: TEST_GAS_LIMIT,
        data: Vec::new(),
        chain_id: b"test-chain".to_vec(),
        version: 1,
        options: 0,
        signature: vec![0; 64],
    };
    let hash = hash_of(args, &tx);
    args.data_pool.transactions.add_data(
        hash,
        tx.clone(),
        &communication_identifier_between(sender_shard, receiver_shard),
    );
    (tx, hash)
}

pub fn pooled_result(
    args: &ArgPreProcessor,
    sender_shard: ShardId,
    receiver_shard: ShardId,
) -> (SmartContractResult, Hash) {
    let scr = SmartContractResult {
        nonce: 1,
        value: U256::from(5u64),
        receiver: address_in_shard(0x22, receiver_shard),
        sender: address_in_shard(0x33, sender_shard),
        data: b"result".to_vec(),
        prev_tx_hash: [0xa1; 32],
        original_tx_hash: [0xa0; 32],
        gas_limit: 20_000,
        gas_price: 1_000_000_000,
    };
    let hash = hash_of(args, &scr);
    args.data_pool.unsigned_transactions.add_data(
        hash,
        scr.clone(),
        &communication_identifier_between(sender_shard, receiver_shard),
    );
    (scr, hash)
}

/// Adds a meta-chain reward for an account of `receiver_shard`.
pub fn pooled_reward(args: &ArgPreProcessor, receiver_shard: ShardId) -> (RewardTransaction, Hash) {
    let reward = RewardTransaction {
        round: 7,
        epoch: 1,
        value: U256::from(1_000u64),
        receiver: address_in_shard(0x44, receiver_shard),
    };
    let hash = hash_of(args, &reward);
    args.data_pool.reward_transactions.add_data(
        hash,
        reward.clone(),
        &communication_identifier_between(METACHAIN_SHARD_ID, receiver_shard),
    );
    (reward, hash)
}

/// Result bound for `receiver_shard`; `salt` keeps hashes apart.
pub fn scr_to_shard(receiver_shard: ShardId, salt: u8) -> SmartContractResult {
    SmartContractResult {
        nonce: u64::from(salt),
        value: U256::from(1u64),
        receiver: address_in_shard(0x55, receiver_shard),
        sender: address_in_shard(0x66, 0),
        data: vec![salt],
        prev_tx_hash: [salt; 32],
        original_tx_hash: [salt; 32],
        gas_limit: 10_000,
        gas_price: 1_000_000_000,
    }
}
