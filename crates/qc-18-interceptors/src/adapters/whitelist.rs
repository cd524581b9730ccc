//! Whitelist of requested hashes.

use crate::ports::WhiteListHandler;
use shared_types::{Cacher, Hash};

pub const DEFAULT_WHITELIST_CAPACITY: usize = 50_000;

/// Bounded whitelist; the oldest entries are evicted first.
pub struct CacheWhiteList {
    hashes: Cacher<()>,
}

impl CacheWhiteList {
    pub fn new(capacity: usize) -> Self {
        Self {
            hashes: Cacher::new(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}

impl Default for CacheWhiteList {
    fn default() -> Self {
        Self::new(DEFAULT_WHITELIST_CAPACITY)
    }
}

impl WhiteListHandler for CacheWhiteList {
    fn is_white_listed(&self, hash: &Hash) -> bool {
        self.hashes.has(hash)
    }

    fn add(&self, hashes: &[Hash]) {
        for hash in hashes {
            self.hashes.put(*hash, ());
        }
    }

    fn remove(&self, hashes: &[Hash]) {
        for hash in hashes {
            self.hashes.remove(hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let whitelist = CacheWhiteList::new(10);
        whitelist.add(&[[1u8; 32], [2u8; 32]]);
        assert!(whitelist.is_white_listed(&[1u8; 32]));

        whitelist.remove(&[[1u8; 32]]);
        assert!(!whitelist.is_white_listed(&[1u8; 32]));
        assert_eq!(whitelist.len(), 1);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let whitelist = CacheWhiteList::new(2);
        whitelist.add(&[[1u8; 32], [2u8; 32], [3u8; 32]]);
        assert!(!whitelist.is_white_listed(&[1u8; 32]));
        assert!(whitelist.is_white_listed(&[3u8; 32]));
    }
}
