//! Gas consumed per transaction in the current block.

use crate::ports::GasHandler;
use parking_lot::Mutex;
use shared_types::Hash;
use std::collections::HashMap;

#[derive(Default)]
pub struct GasTracker {
    consumed: Mutex<HashMap<Hash, u64>>,
}

impl GasTracker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GasHandler for GasTracker {
    fn init(&self) {
        self.consumed.lock().clear();
    }

    fn set_gas_consumed(&self, gas: u64, hash: &Hash) {
        self.consumed.lock().insert(*hash, gas);
    }

    fn gas_consumed(&self, hash: &Hash) -> u64 {
        self.consumed.lock().get(hash).copied().unwrap_or(0)
    }

    fn total_gas_consumed(&self) -> u64 {
        self.consumed
            .lock()
            .values()
            .fold(0u64, |total, gas| total.saturating_add(*gas))
    }

    fn remove_gas_consumed(&self, hashes: &[Hash]) {
        let mut consumed = self.consumed.lock();
        for hash in hashes {
            consumed.remove(hash);
        }
    }
}
