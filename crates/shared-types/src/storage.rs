//! # Storage Units
//!
//! Key-value stores backing block assembly. `ChainStorer` groups one storer
//! per data unit.

use crate::errors::StorageError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Persistent key-value store contract.
pub trait Storer: Send + Sync {
    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), StorageError>;
    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError>;
    fn has(&self, key: &[u8]) -> bool;
    fn remove(&self, key: &[u8]) -> Result<(), StorageError>;
}

/// In-memory storer.
#[derive(Debug, Default)]
pub struct MemoryStorer {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Storer for MemoryStorer {
    fn put(&self, key: &[u8], value: Vec<u8>) -> Result<(), StorageError> {
        self.data.write().insert(key.to_vec(), value);
        Ok(())
    }

    fn get(&self, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(hex::encode(key)))
    }

    fn has(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }

    fn remove(&self, key: &[u8]) -> Result<(), StorageError> {
        self.data.write().remove(key);
        Ok(())
    }
}

/// Data units persisted by the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitType {
    Transaction,
    UnsignedTransaction,
    RewardTransaction,
    MiniBlock,
    ShardHeader,
    MetaBlock,
    PeerChange,
}

impl UnitType {
    pub const ALL: [UnitType; 7] = [
        UnitType::Transaction,
        UnitType::UnsignedTransaction,
        UnitType::RewardTransaction,
        UnitType::MiniBlock,
        UnitType::ShardHeader,
        UnitType::MetaBlock,
        UnitType::PeerChange,
    ];
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One storer per data unit.
#[derive(Default, Clone)]
pub struct ChainStorer {
    units: HashMap<UnitType, Arc<dyn Storer>>,
}

impl ChainStorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storer with an in-memory unit for every `UnitType`.
    pub fn in_memory() -> Self {
        let mut storer = Self::new();
        for unit in UnitType::ALL {
            storer.add_storer(unit, Arc::new(MemoryStorer::new()));
        }
        storer
    }

    pub fn add_storer(&mut self, unit: UnitType, storer: Arc<dyn Storer>) {
        self.units.insert(unit, storer);
    }

    pub fn get_storer(&self, unit: UnitType) -> Result<&Arc<dyn Storer>, StorageError> {
        self.units
            .get(&unit)
            .ok_or_else(|| StorageError::UnitNotFound(unit.to_string()))
    }

    pub fn put(&self, unit: UnitType, key: &[u8], value: Vec<u8>) -> Result<(), StorageError> {
        self.get_storer(unit)?.put(key, value)
    }

    pub fn get(&self, unit: UnitType, key: &[u8]) -> Result<Vec<u8>, StorageError> {
        self.get_storer(unit)?.get(key)
    }

    pub fn has(&self, unit: UnitType, key: &[u8]) -> bool {
        self.units.get(&unit).is_some_and(|s| s.has(key))
    }
}

impl fmt::Debug for ChainStorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainStorer")
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storer_put_get_remove() {
        let storer = MemoryStorer::new();
        storer.put(b"k", b"v".to_vec()).unwrap();
        assert!(storer.has(b"k"));
        assert_eq!(storer.get(b"k").unwrap(), b"v".to_vec());

        storer.remove(b"k").unwrap();
        assert!(matches!(storer.get(b"k"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_chain_storer_missing_unit() {
        let storer = ChainStorer::new();
        assert!(matches!(
            storer.get(UnitType::MiniBlock, b"k"),
            Err(StorageError::UnitNotFound(_))
        ));
        assert!(!storer.has(UnitType::MiniBlock, b"k"));
    }

    #[test]
    fn test_chain_storer_in_memory_has_all_units() {
        let storer = ChainStorer::in_memory();
        for unit in UnitType::ALL {
            assert!(storer.get_storer(unit).is_ok());
        }
        storer.put(UnitType::Transaction, b"h", vec![1]).unwrap();
        assert!(storer.has(UnitType::Transaction, b"h"));
        assert!(!storer.has(UnitType::RewardTransaction, b"h"));
    }
}
