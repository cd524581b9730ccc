//! Intercepted shard and meta-chain headers.

use super::errors::DataError;
use super::intercepted::InterceptedObject;
use crate::ports::{HeaderSigVerifier, ValidityAttester};
use shared_types::{Hash, Header, ShardCoordinator, ShardId, METACHAIN_SHARD_ID};
use std::sync::Arc;

pub struct HeaderValidationContext {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub sig_verifier: Arc<dyn HeaderSigVerifier>,
    pub validity_attester: Arc<dyn ValidityAttester>,
    pub chain_id: Vec<u8>,
}

pub struct InterceptedHeader {
    header: Header,
    raw: Vec<u8>,
    hash: Hash,
    ctx: Arc<HeaderValidationContext>,
}

impl InterceptedHeader {
    pub fn new(header: Header, raw: Vec<u8>, hash: Hash, ctx: Arc<HeaderValidationContext>) -> Self {
        Self {
            header,
            raw,
            hash,
            ctx,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    fn check_integrity(&self) -> Result<(), DataError> {
        let header = &self.header;
        if header.pub_keys_bitmap().is_empty() {
            return Err(DataError::MissingField("pub_keys_bitmap"));
        }
        if header.signature().is_empty() {
            return Err(DataError::MissingField("signature"));
        }
        if header.leader_signature().is_empty() {
            return Err(DataError::MissingField("leader_signature"));
        }
        if header.rand_seed().is_empty() {
            return Err(DataError::MissingField("rand_seed"));
        }
        if header.prev_rand_seed().is_empty() {
            return Err(DataError::MissingField("prev_rand_seed"));
        }
        if header.chain_id() != self.ctx.chain_id.as_slice() {
            return Err(DataError::InvalidChainId);
        }
        if let Header::Shard(shard_header) = header {
            if shard_header.shard_id >= self.ctx.shard_coordinator.number_of_shards() {
                return Err(DataError::InvalidShardId(shard_header.shard_id));
            }
        }
        for mini_block in header.mini_block_headers() {
            self.check_shard(mini_block.sender_shard_id)?;
            self.check_shard(mini_block.receiver_shard_id)?;
        }
        Ok(())
    }

    fn check_shard(&self, shard_id: ShardId) -> Result<(), DataError> {
        if shard_id != METACHAIN_SHARD_ID
            && shard_id >= self.ctx.shard_coordinator.number_of_shards()
        {
            return Err(DataError::InvalidShardId(shard_id));
        }
        Ok(())
    }
}

impl InterceptedObject for InterceptedHeader {
    fn check_validity(&self) -> Result<(), DataError> {
        self.check_integrity()?;
        self.ctx
            .validity_attester
            .check_block_against_rounder(&self.header)?;
        self.ctx
            .validity_attester
            .check_block_against_final(&self.header)?;
        self.ctx.sig_verifier.verify_randomness(&self.header)?;
        self.ctx.sig_verifier.verify_leader_signature(&self.header)?;
        self.ctx.sig_verifier.verify_signature(&self.header)?;
        Ok(())
    }

    /// Meta headers concern everyone; shard headers concern their own shard
    /// and the meta-chain, which notarises them.
    fn is_for_current_shard(&self) -> bool {
        let self_id = self.ctx.shard_coordinator.self_id();
        match &self.header {
            Header::Meta(_) => true,
            Header::Shard(h) => h.shard_id == self_id || self_id == METACHAIN_SHARD_ID,
        }
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn raw(&self) -> &[u8] {
        &self.raw
    }

    fn origin_shard(&self) -> ShardId {
        self.header.shard_id()
    }

    fn type_name(&self) -> &'static str {
        match self.header {
            Header::Shard(_) => "shard header",
            Header::Meta(_) => "meta header",
        }
    }
}
