//! Intercepted validator statistics.

use super::errors::DataError;
use super::intercepted::InterceptedObject;
use crate::ports::KeyGenerator;
use shared_types::{Hash, ShardCoordinator, ShardId, ValidatorInfo, METACHAIN_SHARD_ID};
use std::sync::Arc;

pub struct InterceptedValidatorInfo {
    info: ValidatorInfo,
    raw: Vec<u8>,
    hash: Hash,
    key_gen: Arc<dyn KeyGenerator>,
    shard_coordinator: Arc<ShardCoordinator>,
}

impl InterceptedValidatorInfo {
    pub fn new(
        info: ValidatorInfo,
        raw: Vec<u8>,
        hash: Hash,
        key_gen: Arc<dyn KeyGenerator>,
        shard_coordinator: Arc<ShardCoordinator>,
    ) -> Self {
        Self {
            info,
            raw,
            hash,
            key_gen,
            shard_coordinator,
        }
    }

    pub fn info(&self) -> &ValidatorInfo {
        &self.info
    }
}

impl InterceptedObject for InterceptedValidatorInfo {
    fn check_validity(&self) -> Result<(), DataError> {
        self.key_gen.check_public_key(&self.info.public_key)?;
        if self.info.list.is_empty() {
            return Err(DataError::MissingField("list"));
        }
        let shard = self.info.shard_id;
        if shard != METACHAIN_SHARD_ID && shard >= self.shard_coordinator.number_of_shards() {
            return Err(DataError::InvalidShardId(shard));
        }
        Ok(())
    }

    fn is_for_current_shard(&self) -> bool {
        true
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
        "validator info"
    }
}
