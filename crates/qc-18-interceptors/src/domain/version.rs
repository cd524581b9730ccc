//! Transaction version rules.

use super::errors::DataError;
use shared_types::Transaction;

/// Options bit marking a transaction signed over the hash of its payload.
pub const MASK_SIGNED_WITH_HASH: u32 = 0b0000_0001;

/// Checks transaction versions against the minimum accepted version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxVersionChecker {
    min_version: u32,
}

impl TxVersionChecker {
    pub fn new(min_version: u32) -> Self {
        Self { min_version }
    }

    pub fn min_version(&self) -> u32 {
        self.min_version
    }

    /// Below the minimum is invalid; options are only allowed above it.
    pub fn check_version(&self, tx: &Transaction) -> Result<(), DataError> {
        if tx.version < self.min_version {
            return Err(DataError::InvalidTxVersion {
                version: tx.version,
                min: self.min_version,
            });
        }
        if tx.version == self.min_version && tx.options != 0 {
            return Err(DataError::InvalidTxOptions);
        }
        Ok(())
    }

    pub fn is_signed_with_hash(&self, tx: &Transaction) -> bool {
        tx.version > self.min_version && tx.options & MASK_SIGNED_WITH_HASH != 0
    }
}
