//! # Economics
//!
//! Gas and fee rules applied to transactions at interception and block
//! assembly.

use crate::entities::{Transaction, U256};
use crate::errors::FeeError;
use serde::{Deserialize, Serialize};

/// Fee rules consulted by interceptors and pre-processors.
pub trait FeeHandler: Send + Sync {
    /// Checks gas price and gas limit against the economic rules.
    fn check_validity_tx_values(&self, tx: &Transaction) -> Result<(), FeeError>;

    /// Minimum gas needed to move `tx` (base cost plus data cost).
    fn compute_gas_limit(&self, tx: &Transaction) -> u64;

    fn compute_fee(&self, tx: &Transaction) -> U256;

    fn max_gas_limit_per_block(&self) -> u64;

    fn min_gas_price(&self) -> u64;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicsConfig {
    pub min_gas_price: u64,
    pub min_gas_limit: u64,
    pub gas_per_data_byte: u64,
    pub max_gas_limit_per_block: u64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            min_gas_price: 1_000_000_000,
            min_gas_limit: 50_000,
            gas_per_data_byte: 1_500,
            max_gas_limit_per_block: 1_500_000_000,
        }
    }
}

/// `FeeHandler` backed by static economics parameters.
#[derive(Debug, Clone, Default)]
pub struct EconomicsData {
    config: EconomicsConfig,
}

impl EconomicsData {
    pub fn new(config: EconomicsConfig) -> Self {
        Self { config }
    }
}

impl FeeHandler for EconomicsData {
    fn check_validity_tx_values(&self, tx: &Transaction) -> Result<(), FeeError> {
        if tx.gas_price < self.config.min_gas_price {
            return Err(FeeError::InsufficientGasPrice {
                provided: tx.gas_price,
                min: self.config.min_gas_price,
            });
        }

        let required = self.compute_gas_limit(tx);
        if tx.gas_limit < required {
            return Err(FeeError::InsufficientGasLimit {
                provided: tx.gas_limit,
                required,
            });
        }

        if tx.gas_limit > self.config.max_gas_limit_per_block {
            return Err(FeeError::HigherGasLimitThanBlock {
                provided: tx.gas_limit,
                max: self.config.max_gas_limit_per_block,
            });
        }

        Ok(())
    }

    fn compute_gas_limit(&self, tx: &Transaction) -> u64 {
        let data_cost = (tx.data.len() as u64).saturating_mul(self.config.gas_per_data_byte);
        self.config.min_gas_limit.saturating_add(data_cost)
    }

    fn compute_fee(&self, tx: &Transaction) -> U256 {
        U256::from(tx.gas_price) * U256::from(self.compute_gas_limit(tx))
    }

    fn max_gas_limit_per_block(&self) -> u64 {
        self.config.max_gas_limit_per_block
    }

    fn min_gas_price(&self) -> u64 {
        self.config.min_gas_price
    }
}
