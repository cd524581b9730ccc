//! Intercepted user transactions.

use super::errors::DataError;
use super::intercepted::{InterceptedObject, InterceptedTxHandler};
use super::version::TxVersionChecker;
use crate::ports::{KeyGenerator, SingleSigner, WhiteListHandler};
use shared_types::{
    Address, CodecError, FeeHandler, Hash, Hasher, Marshalizer, ShardCoordinator, ShardId,
    Transaction, U256,
};
use std::sync::Arc;

/// Dependencies of transaction validation, shared by every transaction a
/// factory creates.
pub struct TxValidationContext {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub key_gen: Arc<dyn KeyGenerator>,
    pub signer: Arc<dyn SingleSigner>,
    pub fee_handler: Arc<dyn FeeHandler>,
    pub whitelist: Arc<dyn WhiteListHandler>,
    pub sign_marshalizer: Marshalizer,
    pub sign_hasher: Arc<dyn Hasher>,
    pub chain_id: Vec<u8>,
    pub version_checker: TxVersionChecker,
}

/// Bytes the sender signs.
///
/// Regular transactions sign the marshalled unsigned view; signed-with-hash
/// transactions sign its hash.
pub fn tx_signing_payload(
    tx: &Transaction,
    sign_marshalizer: &Marshalizer,
    sign_hasher: &dyn Hasher,
    version_checker: &TxVersionChecker,
) -> Result<Vec<u8>, CodecError> {
    let payload = sign_marshalizer.marshal(&tx.unsigned_view())?;
    if version_checker.is_signed_with_hash(tx) {
        return Ok(sign_hasher.compute(&payload).to_vec());
    }
    Ok(payload)
}

pub struct InterceptedTransaction {
    tx: Transaction,
    raw: Vec<u8>,
    hash: Hash,
    sender_shard: ShardId,
    receiver_shard: ShardId,
    ctx: Arc<TxValidationContext>,
}

impl InterceptedTransaction {
    pub fn new(tx: Transaction, raw: Vec<u8>, hash: Hash, ctx: Arc<TxValidationContext>) -> Self {
        let sender_shard = ctx.shard_coordinator.compute_id(&tx.sender);
        let receiver_shard = ctx.shard_coordinator.compute_id(&tx.receiver);
        Self {
            tx,
            raw,
            hash,
            sender_shard,
            receiver_shard,
            ctx,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn is_signed_with_hash(&self) -> bool {
        self.ctx.version_checker.is_signed_with_hash(&self.tx)
    }

    fn check_integrity(&self) -> Result<(), DataError> {
        if self.tx.signature.is_empty() {
            return Err(DataError::MissingField("signature"));
        }
        if self.tx.chain_id != self.ctx.chain_id {
            return Err(DataError::InvalidChainId);
        }
        self.ctx.version_checker.check_version(&self.tx)?;
        self.ctx.key_gen.check_public_key(&self.tx.sender)?;
        self.ctx.fee_handler.check_validity_tx_values(&self.tx)?;
        Ok(())
    }

    fn verify_signature(&self) -> Result<(), DataError> {
        let payload = tx_signing_payload(
            &self.tx,
            &self.ctx.sign_marshalizer,
            self.ctx.sign_hasher.as_ref(),
            &self.ctx.version_checker,
        )?;
        self.ctx
            .signer
            .verify(&self.tx.sender, &payload, &self.tx.signature)?;
        Ok(())
    }
}

impl InterceptedObject for InterceptedTransaction {
    fn check_validity(&self) -> Result<(), DataError> {
        self.check_integrity()?;
        // Requested transactions were already vouched for by this node.
        if self.ctx.whitelist.is_white_listed(&self.hash) {
            return Ok(());
        }
        self.verify_signature()
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
        "transaction"
    }
}

impl InterceptedTxHandler for InterceptedTransaction {
    fn sender_shard_id(&self) -> ShardId {
        self.sender_shard
    }

    fn receiver_shard_id(&self) -> ShardId {
        self.receiver_shard
    }

    fn nonce(&self) -> u64 {
        self.tx.nonce
    }

    fn sender_address(&self) -> &Address {
        &self.tx.sender
    }

    fn fee(&self) -> U256 {
        self.ctx.fee_handler.compute_fee(&self.tx)
    }
}
