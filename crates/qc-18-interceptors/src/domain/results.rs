//! Intercepted smart-contract results and reward transactions.
//!
//! Neither carries a user signature: results are vouched for by the block
//! that produced them, rewards by the meta-chain.

use super::errors::DataError;
use super::intercepted::{InterceptedObject, InterceptedTxHandler};
use shared_types::{
    Address, Hash, PubkeyConverter, RewardTransaction, ShardCoordinator, ShardId,
    SmartContractResult, METACHAIN_SHARD_ID, U256,
};
use std::sync::Arc;

/// Dependencies shared by result and reward validation.
pub struct ResultValidationContext {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub pubkey_converter: Arc<dyn PubkeyConverter>,
}

impl ResultValidationContext {
    fn check_address(&self, field: &'static str, address: &Address) -> Result<(), DataError> {
        if address.len() != self.pubkey_converter.address_len() {
            return Err(DataError::InvalidField {
                field,
                reason: format!("expected {} bytes", self.pubkey_converter.address_len()),
            });
        }
        Ok(())
    }
}

pub struct InterceptedUnsignedTransaction {
    scr: SmartContractResult,
    raw: Vec<u8>,
    hash: Hash,
    sender_shard: ShardId,
    receiver_shard: ShardId,
    ctx: Arc<ResultValidationContext>,
}

impl InterceptedUnsignedTransaction {
    pub fn new(
        scr: SmartContractResult,
        raw: Vec<u8>,
        hash: Hash,
        ctx: Arc<ResultValidationContext>,
    ) -> Self {
        let sender_shard = ctx.shard_coordinator.compute_id(&scr.sender);
        let receiver_shard = ctx.shard_coordinator.compute_id(&scr.receiver);
        Self {
            scr,
            raw,
            hash,
            sender_shard,
            receiver_shard,
            ctx,
        }
    }

    pub fn result(&self) -> &SmartContractResult {
        &self.scr
    }
}

impl InterceptedObject for InterceptedUnsignedTransaction {
    fn check_validity(&self) -> Result<(), DataError> {
        self.ctx.check_address("receiver", &self.scr.receiver)?;
        self.ctx.check_address("sender", &self.scr.sender)?;
        if self.scr.prev_tx_hash == [0u8; 32] {
            return Err(DataError::MissingField("prev_tx_hash"));
        }
        if self.scr.original_tx_hash == [0u8; 32] {
            return Err(DataError::MissingField("original_tx_hash"));
        }
        Ok(())
    }

    fn is_for_current_shard(&self) -> bool {
        let self_id = self.ctx.shard_coordinator.self_id();
        self.receiver_shard == self_id || self.sender_shard == self_id
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn origin_shard(&self) -> ShardId {
        self.sender_shard
    }

    fn type_name(&self) -> &'static str {
        "smart contract result"
    }
}

impl InterceptedTxHandler for InterceptedUnsignedTransaction {
    fn sender_shard_id(&self) -> ShardId {
        self.sender_shard
    }

    fn receiver_shard_id(&self) -> ShardId {
        self.receiver_shard
    }

    fn nonce(&self) -> u64 {
        self.scr.nonce
    }

    fn sender_address(&self) -> &Address {
        &self.scr.sender
    }

    fn fee(&self) -> U256 {
        U256::zero()
    }
}

pub struct InterceptedRewardTransaction {
    reward: RewardTransaction,
    raw: Vec<u8>,
    hash: Hash,
    receiver_shard: ShardId,
    ctx: Arc<ResultValidationContext>,
}

/// Rewards have no sender account; this is the meta-chain placeholder.
pub const REWARDS_SENDER: Address = [0u8; 32];

impl InterceptedRewardTransaction {
    pub fn new(
        reward: RewardTransaction,
        raw: Vec<u8>,
        hash: Hash,
        ctx: Arc<ResultValidationContext>,
    ) -> Self {
        let receiver_shard = ctx.shard_coordinator.compute_id(&reward.receiver);
        Self {
            reward,
            raw,
            hash,
            receiver_shard,
            ctx,
        }
    }

    pub fn reward(&self) -> &RewardTransaction {
        &self.reward
    }
}

impl InterceptedObject for InterceptedRewardTransaction {
    fn check_validity(&self) -> Result<(), DataError> {
        self.ctx.check_address("receiver", &self.reward.receiver)?;
        if self.reward.value.is_zero() {
            return Err(DataError::InvalidField {
                field: "value",
                reason: "zero reward".to_string(),
            });
        }
        Ok(())
    }

    fn is_for_current_shard(&self) -> bool {
        let self_id = self.ctx.shard_coordinator.self_id();
        self.receiver_shard == self_id || self_id == METACHAIN_SHARD_ID
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn origin_shard(&self) -> ShardId {
        METACHAIN_SHARD_ID
    }

    fn type_name(&self) -> &'static str {
        "reward transaction"
    }
}

impl InterceptedTxHandler for InterceptedRewardTransaction {
    fn sender_shard_id(&self) -> ShardId {
        METACHAIN_SHARD_ID
    }

    fn receiver_shard_id(&self) -> ShardId {
        self.receiver_shard
    }

    fn nonce(&self) -> u64 {
        self.reward.round
    }

    fn sender_address(&self) -> &Address {
        &REWARDS_SENDER
    }

    fn fee(&self) -> U256 {
        U256::zero()
    }
}
