//! # Transaction Pre-processor
//!
//! Processes the `TxBlock` section of received blocks and, when this node
//! leads, fills new mini-blocks from the transaction pool.
//!
//! ## Mini-block creation
//!
//! For every destination shard (ascending, meta-chain last) the pool
//! partition from this shard to the destination is scanned in
//! (sender, nonce) order. A transaction is included when:
//! - the destination shard is not stuck
//! - its nonce is the next one expected for its sender
//! - the block gas limit and block size still allow it
//! - the transaction processor executes it successfully

use super::base::BasePreProcessor;
use super::ArgPreProcessor;
use crate::domain::{BlockTransaction, PreprocessError};
use crate::ports::{
    BlockSizeComputationHandler, BlockTracker, GasHandler, PreProcessor, TransactionProcessor,
};
use shared_types::{
    AccountsAdapter, Address, BlockType, Body, FeeHandler, Hash, MiniBlock, PubkeyConverter,
    ShardCoordinator, ShardId, Transaction, METACHAIN_SHARD_ID,
};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::iter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

pub struct TransactionPreprocessor {
    base: BasePreProcessor<Transaction>,
    shard_coordinator: Arc<ShardCoordinator>,
    tx_processor: Arc<dyn TransactionProcessor>,
    accounts: Arc<dyn AccountsAdapter>,
    fee_handler: Arc<dyn FeeHandler>,
    gas_handler: Arc<dyn GasHandler>,
    block_tracker: Arc<dyn BlockTracker>,
    block_size: Arc<dyn BlockSizeComputationHandler>,
    pubkey_converter: Arc<dyn PubkeyConverter>,
}

impl TransactionPreprocessor {
    pub fn new(args: &ArgPreProcessor) -> Self {
        let request_handler = Arc::clone(&args.request_handler);
        let base = BasePreProcessor::new(
            Arc::clone(&args.data_pool.transactions),
            Arc::clone(&args.store),
            args.marshalizer.clone(),
            Arc::clone(&args.hasher),
            Arc::new(move |shard_id: ShardId, hashes: &[Hash]| {
                request_handler.request_transaction(shard_id, hashes)
            }),
        );
        Self {
            base,
            shard_coordinator: Arc::clone(&args.shard_coordinator),
            tx_processor: Arc::clone(&args.tx_processor),
            accounts: Arc::clone(&args.accounts),
            fee_handler: Arc::clone(&args.fee_handler),
            gas_handler: Arc::clone(&args.gas_handler),
            block_tracker: Arc::clone(&args.block_tracker),
            block_size: Arc::clone(&args.block_size_computation),
            pubkey_converter: Arc::clone(&args.address_pubkey_converter),
        }
    }

    fn destination_shards(&self) -> impl Iterator<Item = ShardId> {
        (0..self.shard_coordinator.number_of_shards()).chain(iter::once(METACHAIN_SHARD_ID))
    }

    /// Pooled transactions from this shard to `receiver`, in (sender, nonce) order.
    fn candidates(&self, receiver: ShardId) -> Vec<(Hash, Transaction)> {
        let cache_id = self.shard_coordinator.communication_identifier(receiver);
        let Some(partition) = self.base.pool().shard_data_store(&cache_id) else {
            return Vec::new();
        };
        let mut candidates: Vec<_> = partition
            .keys()
            .into_iter()
            .filter_map(|hash| partition.get(&hash).map(|tx| (hash, tx)))
            .collect();
        candidates.sort_by(|(_, a), (_, b)| (a.sender, a.nonce).cmp(&(b.sender, b.nonce)));
        candidates
    }

    /// Next nonce expected for `sender`, loaded from its account on first use.
    fn expected_nonce(&self, nonces: &mut HashMap<Address, u64>, sender: &Address) -> Option<u64> {
        match nonces.entry(*sender) {
            Entry::Occupied(entry) => Some(*entry.get()),
            Entry::Vacant(entry) => match self.accounts.get_existing_account(sender) {
                Ok(account) => Some(*entry.insert(account.nonce)),
                Err(e) => {
                    trace!(error = %e, "sender account not found");
                    None
                }
            },
        }
    }
}

impl PreProcessor for TransactionPreprocessor {
    fn block_type(&self) -> BlockType {
        BlockType::TxBlock
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
        for (hash, tx) in self.base.block_txs_in_order(body)? {
            if !have_time() {
                return Err(PreprocessError::TimeIsOut);
            }
            self.tx_processor.process_transaction(&tx)?;
            self.gas_handler.set_gas_consumed(tx.gas_limit, &hash);
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
        have_time: &dyn Fn() -> bool,
    ) -> Result<Vec<MiniBlock>, PreprocessError> {
        let self_id = self.shard_coordinator.self_id();
        let max_gas = self.fee_handler.max_gas_limit_per_block();
        let mut gas_in_block = self.gas_handler.total_gas_consumed();
        let mut nonces = HashMap::new();
        let mut mini_blocks = Vec::new();

        'shards: for receiver in self.destination_shards() {
            if self.block_tracker.is_shard_stuck(receiver) {
                debug!(shard_id = receiver, "shard is stuck, skipping its transactions");
                continue;
            }

            let mut tx_hashes = Vec::new();
            for (hash, tx) in self.candidates(receiver) {
                if !have_time() {
                    debug!("time is out while creating mini blocks");
                    break 'shards;
                }
                if self
                    .block_size
                    .is_max_block_size_reached(usize::from(tx_hashes.is_empty()), 1)
                {
                    debug!("max block size reached");
                    break 'shards;
                }
                if gas_in_block.saturating_add(tx.gas_limit) > max_gas {
                    continue;
                }
                let Some(expected) = self.expected_nonce(&mut nonces, &tx.sender) else {
                    continue;
                };
                if tx.nonce != expected {
                    continue;
                }
                if let Err(e) = self.tx_processor.process_transaction(&tx) {
                    debug!(
                        sender = %self.pubkey_converter.encode(&tx.sender),
                        nonce = tx.nonce,
                        error = %e,
                        "transaction skipped"
                    );
                    continue;
                }

                nonces.insert(tx.sender, expected + 1);
                gas_in_block += tx.gas_limit;
                self.gas_handler.set_gas_consumed(tx.gas_limit, &hash);
                if tx_hashes.is_empty() {
                    self.block_size.add_num_mini_blocks(1);
                }
                self.block_size.add_num_txs(1);
                self.base.add_used(hash, tx);
                tx_hashes.push(hash);
            }

            if !tx_hashes.is_empty() {
                mini_blocks.push(MiniBlock {
                    tx_hashes,
                    sender_shard_id: self_id,
                    receiver_shard_id: receiver,
                    block_type: BlockType::TxBlock,
                });
            }
        }

        // Mini-blocks still being filled when time ran out are kept.
        debug!(
            mini_blocks = mini_blocks.len(),
            gas = gas_in_block,
            "created transaction mini blocks"
        );
        Ok(mini_blocks)
    }

    fn get_all_current_used_txs(&self) -> HashMap<Hash, BlockTransaction> {
        self.base.get_all_current_used_txs()
    }
}
