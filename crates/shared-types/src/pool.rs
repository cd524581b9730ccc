//! # Data Pools
//!
//! Hash-keyed in-memory caches holding validated objects until block
//! assembly picks them up.
//!
//! Every insert is idempotent: the check and the insert happen under one
//! write lock, so concurrent inserts of the same hash from different
//! pipelines leave exactly one entry and only the first caller sees `true`.
//! Handlers fire once per newly added hash, after the lock is released.

use crate::entities::{
    Hash, Header, MiniBlock, RewardTransaction, ShardId, SmartContractResult, Transaction,
    ValidatorInfo,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Callback invoked with the hash of each newly added object.
pub type PoolHandler = Arc<dyn Fn(&Hash) + Send + Sync>;

struct CacherInner<T> {
    items: HashMap<Hash, T>,
    order: VecDeque<Hash>,
}

/// Bounded single-partition cache with FIFO eviction.
pub struct Cacher<T> {
    inner: RwLock<CacherInner<T>>,
    capacity: usize,
    handlers: RwLock<Vec<PoolHandler>>,
}

impl<T: Clone + Send + Sync> Cacher<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(CacherInner {
                items: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Inserts `value` unless `key` is present. Returns true when added.
    pub fn put(&self, key: Hash, value: T) -> bool {
        let added = self.insert_silent(key, value);
        if added {
            for handler in self.handlers.read().iter() {
                handler(&key);
            }
        }
        added
    }

    fn insert_silent(&self, key: Hash, value: T) -> bool {
        let mut inner = self.inner.write();
        if inner.items.contains_key(&key) {
            return false;
        }

        // Evict oldest if at capacity
        if inner.items.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.items.remove(&oldest);
            }
        }

        inner.items.insert(key, value);
        inner.order.push_back(key);
        true
    }

    pub fn get(&self, key: &Hash) -> Option<T> {
        self.inner.read().items.get(key).cloned()
    }

    pub fn has(&self, key: &Hash) -> bool {
        self.inner.read().items.contains_key(key)
    }

    pub fn remove(&self, key: &Hash) {
        let mut inner = self.inner.write();
        if inner.items.remove(key).is_some() {
            inner.order.retain(|k| k != key);
        }
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<Hash> {
        self.inner.read().order.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().items.is_empty()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.items.clear();
        inner.order.clear();
    }

    pub fn register_handler(&self, handler: PoolHandler) {
        self.handlers.write().push(handler);
    }
}

/// Pool partitioned by cache id (the communication identifier between the
/// sender and receiver shards of the stored objects).
pub struct ShardedDataPool<T> {
    shards: RwLock<HashMap<String, Arc<Cacher<T>>>>,
    capacity_per_shard: usize,
    handlers: RwLock<Vec<PoolHandler>>,
}

impl<T: Clone + Send + Sync> ShardedDataPool<T> {
    pub fn new(capacity_per_shard: usize) -> Self {
        Self {
            shards: RwLock::new(HashMap::new()),
            capacity_per_shard,
            handlers: RwLock::new(Vec::new()),
        }
    }

    fn shard_or_create(&self, cache_id: &str) -> Arc<Cacher<T>> {
        if let Some(cacher) = self.shards.read().get(cache_id) {
            return Arc::clone(cacher);
        }
        let mut shards = self.shards.write();
        Arc::clone(
            shards
                .entry(cache_id.to_string())
                .or_insert_with(|| Arc::new(Cacher::new(self.capacity_per_shard))),
        )
    }

    /// Adds `value` to the `cache_id` partition. Returns true when added.
    pub fn add_data(&self, key: Hash, value: T, cache_id: &str) -> bool {
        let added = self.shard_or_create(cache_id).insert_silent(key, value);
        if added {
            for handler in self.handlers.read().iter() {
                handler(&key);
            }
        }
        added
    }

    /// First match for `key` across all partitions.
    pub fn search_first_data(&self, key: &Hash) -> Option<T> {
        self.shards.read().values().find_map(|c| c.get(key))
    }

    pub fn shard_data_store(&self, cache_id: &str) -> Option<Arc<Cacher<T>>> {
        self.shards.read().get(cache_id).cloned()
    }

    pub fn remove_data(&self, key: &Hash, cache_id: &str) {
        if let Some(cacher) = self.shards.read().get(cache_id) {
            cacher.remove(key);
        }
    }

    pub fn remove_set_of_data_from_pool(&self, keys: &[Hash], cache_id: &str) {
        if let Some(cacher) = self.shards.read().get(cache_id) {
            for key in keys {
                cacher.remove(key);
            }
        }
    }

    pub fn remove_data_from_all_shards(&self, key: &Hash) {
        for cacher in self.shards.read().values() {
            cacher.remove(key);
        }
    }

    pub fn cache_ids(&self) -> Vec<String> {
        self.shards.read().keys().cloned().collect()
    }

    /// Total objects across partitions.
    pub fn len(&self) -> usize {
        self.shards.read().values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn register_handler(&self, handler: PoolHandler) {
        self.handlers.write().push(handler);
    }
}

struct HeadersInner {
    by_hash: HashMap<Hash, Header>,
    by_nonce: HashMap<(ShardId, u64), Vec<Hash>>,
    order: VecDeque<Hash>,
}

/// Headers indexed by hash and by (shard, nonce).
pub struct HeadersPool {
    inner: RwLock<HeadersInner>,
    capacity: usize,
    handlers: RwLock<Vec<PoolHandler>>,
}

impl HeadersPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(HeadersInner {
                by_hash: HashMap::new(),
                by_nonce: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Adds `header` unless `hash` is present. Returns true when added.
    pub fn add_header(&self, hash: Hash, header: Header) -> bool {
        {
            let mut inner = self.inner.write();
            if inner.by_hash.contains_key(&hash) {
                return false;
            }
            if inner.by_hash.len() >= self.capacity {
                if let Some(oldest) = inner.order.pop_front() {
                    Self::unlink(&mut inner, &oldest);
                }
            }
            inner
                .by_nonce
                .entry((header.shard_id(), header.nonce()))
                .or_default()
                .push(hash);
            inner.by_hash.insert(hash, header);
            inner.order.push_back(hash);
        }

        for handler in self.handlers.read().iter() {
            handler(&hash);
        }
        true
    }

    fn unlink(inner: &mut HeadersInner, hash: &Hash) {
        if let Some(header) = inner.by_hash.remove(hash) {
            let index = (header.shard_id(), header.nonce());
            if let Some(hashes) = inner.by_nonce.get_mut(&index) {
                hashes.retain(|h| h != hash);
                if hashes.is_empty() {
                    inner.by_nonce.remove(&index);
                }
            }
        }
    }

    pub fn get_header_by_hash(&self, hash: &Hash) -> Option<Header> {
        self.inner.read().by_hash.get(hash).cloned()
    }

    pub fn get_headers_by_nonce_and_shard_id(&self, nonce: u64, shard_id: ShardId) -> Vec<(Hash, Header)> {
        let inner = self.inner.read();
        inner
            .by_nonce
            .get(&(shard_id, nonce))
            .map(|hashes| {
                hashes
                    .iter()
                    .filter_map(|h| inner.by_hash.get(h).map(|hdr| (*h, hdr.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn has(&self, hash: &Hash) -> bool {
        self.inner.read().by_hash.contains_key(hash)
    }

    pub fn remove_header_by_hash(&self, hash: &Hash) {
        let mut inner = self.inner.write();
        Self::unlink(&mut inner, hash);
        inner.order.retain(|h| h != hash);
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().by_hash.is_empty()
    }

    pub fn register_handler(&self, handler: PoolHandler) {
        self.handlers.write().push(handler);
    }
}

/// Capacities of the node's data pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolsConfig {
    pub transactions_per_shard: usize,
    pub unsigned_transactions_per_shard: usize,
    pub reward_transactions_per_shard: usize,
    pub headers: usize,
    pub mini_blocks: usize,
    pub trie_nodes: usize,
    pub validator_infos: usize,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        Self {
            transactions_per_shard: 100_000,
            unsigned_transactions_per_shard: 75_000,
            reward_transactions_per_shard: 75_000,
            headers: 1_000,
            mini_blocks: 30_000,
            trie_nodes: 500_000,
            validator_infos: 10_000,
        }
    }
}

/// All data pools of a node.
#[derive(Clone)]
pub struct PoolsHolder {
    pub transactions: Arc<ShardedDataPool<Transaction>>,
    pub unsigned_transactions: Arc<ShardedDataPool<SmartContractResult>>,
    pub reward_transactions: Arc<ShardedDataPool<RewardTransaction>>,
    pub headers: Arc<HeadersPool>,
    pub mini_blocks: Arc<Cacher<MiniBlock>>,
    pub trie_nodes: Arc<Cacher<Vec<u8>>>,
    pub validator_infos: Arc<Cacher<ValidatorInfo>>,
}

impl PoolsHolder {
    pub fn new(config: &PoolsConfig) -> Self {
        Self {
            transactions: Arc::new(ShardedDataPool::new(config.transactions_per_shard)),
            unsigned_transactions: Arc::new(ShardedDataPool::new(
                config.unsigned_transactions_per_shard,
            )),
            reward_transactions: Arc::new(ShardedDataPool::new(
                config.reward_transactions_per_shard,
            )),
            headers: Arc::new(HeadersPool::new(config.headers)),
            mini_blocks: Arc::new(Cacher::new(config.mini_blocks)),
            trie_nodes: Arc::new(Cacher::new(config.trie_nodes)),
            validator_infos: Arc::new(Cacher::new(config.validator_infos)),
        }
    }
}

impl Default for PoolsHolder {
    fn default() -> Self {
        Self::new(&PoolsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ShardHeader;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_cacher_put_is_idempotent() {
        let cacher = Cacher::new(10);
        assert!(cacher.put([1u8; 32], 1));
        assert!(!cacher.put([1u8; 32], 2));
        assert_eq!(cacher.get(&[1u8; 32]), Some(1));
        assert_eq!(cacher.len(), 1);
    }

    #[test]
    fn test_cacher_eviction() {
        let cacher = Cacher::new(3);
        for i in 1..=4u8 {
            cacher.put([i; 32], i);
        }
        assert_eq!(cacher.len(), 3);
        assert!(!cacher.has(&[1u8; 32]));
        assert!(cacher.has(&[4u8; 32]));
    }

    #[test]
    fn test_concurrent_identical_inserts_single_entry() {
        let pool = Arc::new(ShardedDataPool::new(100));
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&notified);
        pool.register_handler(Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let barrier = Arc::new(Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    pool.add_data([7u8; 32], 42u64, "_0")
                })
            })
            .collect();

        let added: usize = handles
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(added, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sharded_pool_partitions() {
        let pool = ShardedDataPool::new(10);
        pool.add_data([1u8; 32], "a", "_0");
        pool.add_data([2u8; 32], "b", "_0_1");

        assert_eq!(pool.search_first_data(&[2u8; 32]), Some("b"));
        assert_eq!(pool.shard_data_store("_0").map(|c| c.len()), Some(1));

        pool.remove_data_from_all_shards(&[2u8; 32]);
        assert!(pool.search_first_data(&[2u8; 32]).is_none());
    }

    #[test]
    fn test_headers_pool_by_nonce() {
        let pool = HeadersPool::new(10);
        let header = Header::Shard(ShardHeader {
            nonce: 5,
            shard_id: 1,
            ..Default::default()
        });
        assert!(pool.add_header([9u8; 32], header.clone()));
        assert!(!pool.add_header([9u8; 32], header));

        let found = pool.get_headers_by_nonce_and_shard_id(5, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, [9u8; 32]);

        pool.remove_header_by_hash(&[9u8; 32]);
        assert!(pool.get_headers_by_nonce_and_shard_id(5, 1).is_empty());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_pools_config_from_json_uses_defaults() {
        let config: PoolsConfig = serde_json::from_str(r#"{"headers": 5}"#).unwrap();
        assert_eq!(config.headers, 5);
        assert_eq!(config.mini_blocks, PoolsConfig::default().mini_blocks);
    }
}
