//! Account-state checks for transactions entering the pool.

use crate::domain::{InterceptedTxHandler, ProcessorError};
use shared_types::{AccountsAdapter, ShardCoordinator};
use std::sync::Arc;

pub trait TxValidator: Send + Sync {
    fn check_tx_validity(&self, tx: &dyn InterceptedTxHandler) -> Result<(), ProcessorError>;
}

/// Accepts everything. Used for results and rewards, which carry no
/// sender account.
#[derive(Debug, Default, Clone, Copy)]
pub struct NilTxValidator;

impl TxValidator for NilTxValidator {
    fn check_tx_validity(&self, _tx: &dyn InterceptedTxHandler) -> Result<(), ProcessorError> {
        Ok(())
    }
}

/// Sender must exist with a nonce in `[account, account + max_nonce_delta]`.
///
/// Only senders of this shard are checked; their state lives here.
pub struct AccountTxValidator {
    accounts: Arc<dyn AccountsAdapter>,
    shard_coordinator: Arc<ShardCoordinator>,
    max_nonce_delta: u64,
}

impl AccountTxValidator {
    pub fn new(
        accounts: Arc<dyn AccountsAdapter>,
        shard_coordinator: Arc<ShardCoordinator>,
        max_nonce_delta: u64,
    ) -> Self {
        Self {
            accounts,
            shard_coordinator,
            max_nonce_delta,
        }
    }
}

impl TxValidator for AccountTxValidator {
    fn check_tx_validity(&self, tx: &dyn InterceptedTxHandler) -> Result<(), ProcessorError> {
        if tx.sender_shard_id() != self.shard_coordinator.self_id() {
            return Ok(());
        }
        let account = self
            .accounts
            .get_existing_account(tx.sender_address())
            .map_err(|_| ProcessorError::AccountNotFound)?;

        let nonce = tx.nonce();
        if nonce < account.nonce {
            return Err(ProcessorError::NonceTooLow {
                account: account.nonce,
                tx: nonce,
            });
        }
        if nonce - account.nonce > self.max_nonce_delta {
            return Err(ProcessorError::NonceTooHigh {
                account: account.nonce,
                tx: nonce,
                max_delta: self.max_nonce_delta,
            });
        }
        Ok(())
    }
}
