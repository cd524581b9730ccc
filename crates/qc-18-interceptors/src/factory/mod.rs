//! # Intercepted-Data Factories
//!
//! One factory per category turns raw wire bytes into an `InterceptedData`
//! variant. Decoding is bounded by the marshalizer; every failure is a
//! `DataError`, never a panic.
//!
//! Factories are built once per container build from a fully resolved
//! `ArgInterceptedDataFactory`.

pub mod header;
pub mod results;
pub mod structural;
pub mod transaction;

pub use header::{HeaderKind, InterceptedHeaderFactory};
pub use results::{InterceptedRewardTxFactory, InterceptedUnsignedTxFactory};
pub use structural::{
    InterceptedMiniBlockFactory, InterceptedTrieNodeFactory, InterceptedValidatorInfoFactory,
};
pub use transaction::InterceptedTxFactory;

use crate::domain::{DataError, FactoryError, InterceptedData};
use crate::ports::{
    EpochStartTrigger, HeaderSigVerifier, KeyGenerator, SingleSigner, ValidityAttester,
    WhiteListHandler,
};
use serde::Serialize;
use shared_types::{
    calculate_hash, FeeHandler, Hash, Hasher, Marshalizer, PubkeyConverter, ShardCoordinator,
};
use std::sync::Arc;

/// Decodes raw bytes into typed intercepted data.
pub trait InterceptedDataFactory: Send + Sync {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError>;
}

/// Dependencies shared by every data factory of one container.
#[derive(Clone)]
pub struct ArgInterceptedDataFactory {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub marshalizer: Marshalizer,
    pub tx_sign_marshalizer: Marshalizer,
    pub hasher: Arc<dyn Hasher>,
    pub tx_sign_hasher: Arc<dyn Hasher>,
    pub header_sig_verifier: Arc<dyn HeaderSigVerifier>,
    pub validity_attester: Arc<dyn ValidityAttester>,
    pub tx_key_gen: Arc<dyn KeyGenerator>,
    pub tx_single_signer: Arc<dyn SingleSigner>,
    pub block_key_gen: Arc<dyn KeyGenerator>,
    pub fee_handler: Arc<dyn FeeHandler>,
    pub whitelist: Arc<dyn WhiteListHandler>,
    pub address_pubkey_converter: Arc<dyn PubkeyConverter>,
    pub epoch_start_trigger: Arc<dyn EpochStartTrigger>,
    pub chain_id: Vec<u8>,
    pub min_tx_version: u32,
    pub enable_signed_tx_with_hash_epoch: u32,
}

impl ArgInterceptedDataFactory {
    /// Checks the plain-value arguments; references are non-optional.
    pub fn check(&self) -> Result<(), FactoryError> {
        if self.chain_id.is_empty() {
            return Err(FactoryError::EmptyChainId);
        }
        if self.min_tx_version == 0 {
            return Err(FactoryError::InvalidMinTxVersion);
        }
        Ok(())
    }
}

/// Canonical content hash: the hash of the re-marshalled object.
fn content_hash<T: Serialize>(
    marshalizer: &Marshalizer,
    hasher: &dyn Hasher,
    value: &T,
) -> Result<Hash, DataError> {
    Ok(calculate_hash(marshalizer, hasher, value)?)
}
