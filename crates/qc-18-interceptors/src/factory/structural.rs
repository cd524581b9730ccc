//! Factories for data without user signatures: trie nodes, mini-blocks and
//! validator infos.

use super::{content_hash, ArgInterceptedDataFactory, InterceptedDataFactory};
use crate::domain::{
    DataError, InterceptedData, InterceptedMiniBlock, InterceptedTrieNode,
    InterceptedValidatorInfo,
};
use crate::ports::KeyGenerator;
use shared_types::{Hasher, Marshalizer, MiniBlock, ShardCoordinator, TrieNode, ValidatorInfo};
use std::sync::Arc;

/// Trie nodes are addressed by the hash of their encoding.
pub struct InterceptedTrieNodeFactory {
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
}

impl InterceptedTrieNodeFactory {
    pub fn new(args: &ArgInterceptedDataFactory) -> Self {
        Self {
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
        }
    }
}

impl InterceptedDataFactory for InterceptedTrieNodeFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let node: TrieNode = self.marshalizer.unmarshal(raw)?;
        let hash = self.hasher.compute(raw);
        Ok(InterceptedData::TrieNode(InterceptedTrieNode::new(
            node,
            raw.to_vec(),
            hash,
        )))
    }
}

pub struct InterceptedMiniBlockFactory {
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    shard_coordinator: Arc<ShardCoordinator>,
}

impl InterceptedMiniBlockFactory {
    pub fn new(args: &ArgInterceptedDataFactory) -> Self {
        Self {
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            shard_coordinator: Arc::clone(&args.shard_coordinator),
        }
    }
}

impl InterceptedDataFactory for InterceptedMiniBlockFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let mini_block: MiniBlock = self.marshalizer.unmarshal(raw)?;
        let hash = content_hash(&self.marshalizer, self.hasher.as_ref(), &mini_block)?;
        Ok(InterceptedData::MiniBlock(InterceptedMiniBlock::new(
            mini_block,
            raw.to_vec(),
            hash,
            Arc::clone(&self.shard_coordinator),
        )))
    }
}

pub struct InterceptedValidatorInfoFactory {
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    key_gen: Arc<dyn KeyGenerator>,
    shard_coordinator: Arc<ShardCoordinator>,
}

impl InterceptedValidatorInfoFactory {
    pub fn new(args: &ArgInterceptedDataFactory) -> Self {
        Self {
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            key_gen: Arc::clone(&args.block_key_gen),
            shard_coordinator: Arc::clone(&args.shard_coordinator),
        }
    }
}

impl InterceptedDataFactory for InterceptedValidatorInfoFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let info: ValidatorInfo = self.marshalizer.unmarshal(raw)?;
        let hash = content_hash(&self.marshalizer, self.hasher.as_ref(), &info)?;
        Ok(InterceptedData::ValidatorInfo(InterceptedValidatorInfo::new(
            info,
            raw.to_vec(),
            hash,
            Arc::clone(&self.key_gen),
            Arc::clone(&self.shard_coordinator),
        )))
    }
}
