//! Transaction factory.
//!
//! Owns the "signed with hash" feature flag. The flag is registered with
//! the epoch-start trigger when the factory is built and flips once the
//! activation epoch is confirmed; until then signed-with-hash transactions
//! are rejected at decode time.

use super::{content_hash, ArgInterceptedDataFactory, InterceptedDataFactory};
use crate::domain::{
    DataError, EpochFeatureFlag, FactoryError, InterceptedData, InterceptedTransaction,
    TxValidationContext, TxVersionChecker,
};
use crate::ports::EpochConfirmedHandler;
use shared_types::{Hasher, Marshalizer, Transaction};
use std::sync::Arc;

const SIGNED_TX_WITH_HASH_FLAG: &str = "signed tx with hash";

pub struct InterceptedTxFactory {
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    ctx: Arc<TxValidationContext>,
    signed_with_hash: Arc<EpochFeatureFlag>,
}

impl InterceptedTxFactory {
    pub fn new(args: &ArgInterceptedDataFactory) -> Result<Self, FactoryError> {
        args.check()?;

        let signed_with_hash = Arc::new(EpochFeatureFlag::new(
            SIGNED_TX_WITH_HASH_FLAG,
            args.enable_signed_tx_with_hash_epoch,
        ));
        let handler: Arc<dyn EpochConfirmedHandler> = signed_with_hash.clone();
        args.epoch_start_trigger.register_handler(handler);

        Ok(Self {
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            ctx: Arc::new(TxValidationContext {
                shard_coordinator: Arc::clone(&args.shard_coordinator),
                key_gen: Arc::clone(&args.tx_key_gen),
                signer: Arc::clone(&args.tx_single_signer),
                fee_handler: Arc::clone(&args.fee_handler),
                whitelist: Arc::clone(&args.whitelist),
                sign_marshalizer: args.tx_sign_marshalizer.clone(),
                sign_hasher: Arc::clone(&args.tx_sign_hasher),
                chain_id: args.chain_id.clone(),
                version_checker: TxVersionChecker::new(args.min_tx_version),
            }),
            signed_with_hash,
        })
    }

    pub fn is_signed_tx_with_hash_enabled(&self) -> bool {
        self.signed_with_hash.is_enabled()
    }
}

impl InterceptedDataFactory for InterceptedTxFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let tx: Transaction = self.marshalizer.unmarshal(raw)?;
        let hash = content_hash(&self.marshalizer, self.hasher.as_ref(), &tx)?;
        let intercepted = InterceptedTransaction::new(tx, raw.to_vec(), hash, Arc::clone(&self.ctx));

        if intercepted.is_signed_with_hash() && !self.signed_with_hash.is_enabled() {
            return Err(DataError::SignedWithHashNotEnabled);
        }
        Ok(InterceptedData::Transaction(intercepted))
    }
}
