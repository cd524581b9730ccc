//! Block size estimate from mini-block and transaction counts.

use crate::ports::BlockSizeComputationHandler;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serialized overhead of one mini-block, header entry included.
pub const MINI_BLOCK_SIZE: usize = 16;
/// Serialized size of one transaction hash inside a mini-block.
pub const TX_SIZE: usize = 32;
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4 * 1024 * 1024;

pub struct BlockSizeComputation {
    max_block_size: usize,
    num_mini_blocks: AtomicUsize,
    num_txs: AtomicUsize,
}

impl BlockSizeComputation {
    pub fn new(max_block_size: usize) -> Self {
        Self {
            max_block_size,
            num_mini_blocks: AtomicUsize::new(0),
            num_txs: AtomicUsize::new(0),
        }
    }

    pub fn estimated_size(&self) -> usize {
        Self::size_of(
            self.num_mini_blocks.load(Ordering::Relaxed),
            self.num_txs.load(Ordering::Relaxed),
        )
    }

    fn size_of(mini_blocks: usize, txs: usize) -> usize {
        mini_blocks
            .saturating_mul(MINI_BLOCK_SIZE)
            .saturating_add(txs.saturating_mul(TX_SIZE))
    }
}

impl Default for BlockSizeComputation {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOCK_SIZE)
    }
}

impl BlockSizeComputationHandler for BlockSizeComputation {
    fn init(&self) {
        self.num_mini_blocks.store(0, Ordering::Relaxed);
        self.num_txs.store(0, Ordering::Relaxed);
    }

    fn add_num_mini_blocks(&self, count: usize) {
        self.num_mini_blocks.fetch_add(count, Ordering::Relaxed);
    }

    fn add_num_txs(&self, count: usize) {
        self.num_txs.fetch_add(count, Ordering::Relaxed);
    }

    fn is_max_block_size_reached(&self, num_new_mini_blocks: usize, num_new_txs: usize) -> bool {
        let added = Self::size_of(num_new_mini_blocks, num_new_txs);
        self.estimated_size().saturating_add(added) > self.max_block_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_reached() {
        let computation = BlockSizeComputation::new(MINI_BLOCK_SIZE + 2 * TX_SIZE);
        assert!(!computation.is_max_block_size_reached(1, 2));
        assert!(computation.is_max_block_size_reached(1, 3));

        computation.add_num_mini_blocks(1);
        computation.add_num_txs(2);
        assert_eq!(computation.estimated_size(), MINI_BLOCK_SIZE + 2 * TX_SIZE);
        assert!(computation.is_max_block_size_reached(0, 1));

        computation.init();
        assert_eq!(computation.estimated_size(), 0);
    }
}
