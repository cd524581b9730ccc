//! Smart-contract result and reward transaction factories.

use super::{content_hash, ArgInterceptedDataFactory, InterceptedDataFactory};
use crate::domain::{
    DataError, FactoryError, InterceptedData, InterceptedRewardTransaction,
    InterceptedUnsignedTransaction, ResultValidationContext,
};
use shared_types::{Hasher, Marshalizer, RewardTransaction, SmartContractResult};
use std::sync::Arc;

fn result_context(args: &ArgInterceptedDataFactory) -> Arc<ResultValidationContext> {
    Arc::new(ResultValidationContext {
        shard_coordinator: Arc::clone(&args.shard_coordinator),
        pubkey_converter: Arc::clone(&args.address_pubkey_converter),
    })
}

pub struct InterceptedUnsignedTxFactory {
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    ctx: Arc<ResultValidationContext>,
}

impl InterceptedUnsignedTxFactory {
    pub fn new(args: &ArgInterceptedDataFactory) -> Result<Self, FactoryError> {
        args.check()?;
        Ok(Self {
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            ctx: result_context(args),
        })
    }
}

impl InterceptedDataFactory for InterceptedUnsignedTxFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let scr: SmartContractResult = self.marshalizer.unmarshal(raw)?;
        let hash = content_hash(&self.marshalizer, self.hasher.as_ref(), &scr)?;
        Ok(InterceptedData::SmartContractResult(
            InterceptedUnsignedTransaction::new(scr, raw.to_vec(), hash, Arc::clone(&self.ctx)),
        ))
    }
}

pub struct InterceptedRewardTxFactory {
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    ctx: Arc<ResultValidationContext>,
}

impl InterceptedRewardTxFactory {
    pub fn new(args: &ArgInterceptedDataFactory) -> Result<Self, FactoryError> {
        args.check()?;
        Ok(Self {
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            ctx: result_context(args),
        })
    }
}

impl InterceptedDataFactory for InterceptedRewardTxFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let reward: RewardTransaction = self.marshalizer.unmarshal(raw)?;
        let hash = content_hash(&self.marshalizer, self.hasher.as_ref(), &reward)?;
        Ok(InterceptedData::RewardTransaction(
            InterceptedRewardTransaction::new(reward, raw.to_vec(), hash, Arc::clone(&self.ctx)),
        ))
    }
}
