//! State shared by the transaction-like pre-processors.
//!
//! Tracks the objects a block body references, fetches them from the pool
//! partition of their mini-block (falling back to the store), requests the
//! missing ones and wakes `is_data_prepared` once the pool delivers them.

use crate::domain::{BlockTransaction, BlockTxKind, PreprocessError};
use parking_lot::{Condvar, Mutex};
use shared_types::{
    communication_identifier_between, Body, ChainStorer, Hash, Hasher, Marshalizer, MiniBlock,
    ShardId, ShardedDataPool, UnitType,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Asks peers of a shard for the given hashes.
pub(crate) type RequestFn = Arc<dyn Fn(ShardId, &[Hash]) + Send + Sync>;

struct BlockTxsState<T> {
    txs: HashMap<Hash, T>,
    /// Missing hash → pool partition it is expected in.
    missing: HashMap<Hash, String>,
}

struct BlockTxs<T> {
    state: Mutex<BlockTxsState<T>>,
    all_received: Condvar,
}

impl<T: BlockTxKind> BlockTxs<T> {
    fn new() -> Self {
        Self {
            state: Mutex::new(BlockTxsState {
                txs: HashMap::new(),
                missing: HashMap::new(),
            }),
            all_received: Condvar::new(),
        }
    }

    /// Pool insert handler.
    fn on_received(&self, hash: &Hash, pool: &ShardedDataPool<T>) {
        let mut state = self.state.lock();
        let Some(cache_id) = state.missing.get(hash) else {
            return;
        };
        let Some(tx) = pool.shard_data_store(cache_id).and_then(|c| c.get(hash)) else {
            return;
        };
        state.missing.remove(hash);
        state.txs.insert(*hash, tx);
        if state.missing.is_empty() {
            self.all_received.notify_all();
        }
    }
}

pub(crate) struct BasePreProcessor<T: BlockTxKind> {
    pool: Arc<ShardedDataPool<T>>,
    store: Arc<ChainStorer>,
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    request: RequestFn,
    block_txs: Arc<BlockTxs<T>>,
}

impl<T: BlockTxKind> BasePreProcessor<T> {
    pub(crate) fn new(
        pool: Arc<ShardedDataPool<T>>,
        store: Arc<ChainStorer>,
        marshalizer: Marshalizer,
        hasher: Arc<dyn Hasher>,
        request: RequestFn,
    ) -> Self {
        let block_txs = Arc::new(BlockTxs::new());

        let receiver = Arc::clone(&block_txs);
        let weak_pool: Weak<ShardedDataPool<T>> = Arc::downgrade(&pool);
        pool.register_handler(Arc::new(move |hash: &Hash| {
            if let Some(pool) = weak_pool.upgrade() {
                receiver.on_received(hash, &pool);
            }
        }));

        Self {
            pool,
            store,
            marshalizer,
            hasher,
            request,
            block_txs,
        }
    }

    pub(crate) fn pool(&self) -> &ShardedDataPool<T> {
        &self.pool
    }

    /// Mini-blocks of `body` belonging to this section.
    pub(crate) fn mini_blocks<'a>(&self, body: &'a Body) -> impl Iterator<Item = &'a MiniBlock> {
        body.mini_blocks
            .iter()
            .filter(|mb| mb.block_type == T::BLOCK_TYPE)
    }

    pub(crate) fn create_block_started(&self) {
        let mut state = self.block_txs.state.lock();
        state.txs.clear();
        state.missing.clear();
    }

    fn from_store(&self, hash: &Hash) -> Option<T> {
        let bytes = self.store.get(T::UNIT, hash).ok()?;
        match self.marshalizer.unmarshal(&bytes) {
            Ok(tx) => Some(tx),
            Err(e) => {
                debug!(block_type = %T::BLOCK_TYPE, error = %e, "undecodable stored transaction");
                None
            }
        }
    }

    pub(crate) fn request_block_transactions(&self, body: &Body) -> usize {
        let mut missing_by_shard: BTreeMap<ShardId, Vec<Hash>> = BTreeMap::new();
        {
            let mut state = self.block_txs.state.lock();
            state.txs.clear();
            state.missing.clear();

            for mb in self.mini_blocks(body) {
                let cache_id =
                    communication_identifier_between(mb.sender_shard_id, mb.receiver_shard_id);
                let partition = self.pool.shard_data_store(&cache_id);
                for hash in &mb.tx_hashes {
                    let found = partition
                        .as_ref()
                        .and_then(|c| c.get(hash))
                        .or_else(|| self.from_store(hash));
                    match found {
                        Some(tx) => {
                            state.txs.insert(*hash, tx);
                        }
                        None => {
                            if state.missing.insert(*hash, cache_id.clone()).is_none() {
                                missing_by_shard
                                    .entry(mb.sender_shard_id)
                                    .or_default()
                                    .push(*hash);
                            }
                        }
                    }
                }
            }
        }

        let mut requested = 0;
        for (shard_id, hashes) in &missing_by_shard {
            debug!(
                block_type = %T::BLOCK_TYPE,
                shard_id,
                count = hashes.len(),
                "requesting missing transactions"
            );
            (self.request)(*shard_id, hashes.as_slice());
            requested += hashes.len();
        }
        requested
    }

    pub(crate) fn is_data_prepared(
        &self,
        requested: usize,
        timeout: Duration,
    ) -> Result<(), PreprocessError> {
        if requested == 0 {
            return Ok(());
        }
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.block_txs.state.lock();
        while !state.missing.is_empty() {
            let Some(deadline) = deadline else {
                self.block_txs.all_received.wait(&mut state);
                continue;
            };
            if self
                .block_txs
                .all_received
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                break;
            }
        }
        match state.missing.len() {
            0 => Ok(()),
            missing => Err(PreprocessError::DataNotPrepared { missing }),
        }
    }

    /// Objects of this section in block order.
    pub(crate) fn block_txs_in_order(&self, body: &Body) -> Result<Vec<(Hash, T)>, PreprocessError> {
        let state = self.block_txs.state.lock();
        self.mini_blocks(body)
            .flat_map(|mb| mb.tx_hashes.iter())
            .map(|hash| {
                state
                    .txs
                    .get(hash)
                    .cloned()
                    .map(|tx| (*hash, tx))
                    .ok_or(PreprocessError::MissingTransaction(*hash))
            })
            .collect()
    }

    /// Records an object picked while creating mini-blocks.
    pub(crate) fn add_used(&self, hash: Hash, tx: T) {
        self.block_txs.state.lock().txs.insert(hash, tx);
    }

    pub(crate) fn save_tx_block_to_storage(&self, body: &Body) -> Result<(), PreprocessError> {
        for mb in self.mini_blocks(body) {
            let bytes = self.marshalizer.marshal(mb)?;
            let mb_hash = self.hasher.compute(&bytes);
            self.store.put(UnitType::MiniBlock, &mb_hash, bytes)?;
        }
        let txs = self.block_txs_in_order(body)?;
        for (hash, tx) in &txs {
            let bytes = self.marshalizer.marshal(tx)?;
            self.store.put(T::UNIT, hash, bytes)?;
        }
        trace!(block_type = %T::BLOCK_TYPE, count = txs.len(), "saved block transactions");
        Ok(())
    }

    pub(crate) fn remove_tx_block_from_pools(&self, body: &Body) {
        for mb in self.mini_blocks(body) {
            let cache_id =
                communication_identifier_between(mb.sender_shard_id, mb.receiver_shard_id);
            self.pool.remove_set_of_data_from_pool(&mb.tx_hashes, &cache_id);
        }
    }

    pub(crate) fn get_all_current_used_txs(&self) -> HashMap<Hash, BlockTransaction> {
        self.block_txs
            .state
            .lock()
            .txs
            .iter()
            .map(|(hash, tx)| (*hash, tx.clone().into_block_tx()))
            .collect()
    }
}
