//! Processors for trie nodes, mini-blocks and validator infos.

use super::InterceptorProcessor;
use crate::domain::intercepted::hex_prefix;
use crate::domain::{InterceptedData, InterceptedObject, ProcessorError, ValidatedData};
use shared_types::{Cacher, ChainStorer, MiniBlock, PeerId, UnitType, ValidatorInfo};
use std::sync::Arc;
use tracing::trace;

/// Trie nodes are pooled as raw encodings; the sync layer decodes them.
pub struct TrieNodeInterceptorProcessor {
    pool: Arc<Cacher<Vec<u8>>>,
}

impl TrieNodeInterceptorProcessor {
    pub fn new(pool: Arc<Cacher<Vec<u8>>>) -> Self {
        Self { pool }
    }
}

impl InterceptorProcessor for TrieNodeInterceptorProcessor {
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError> {
        match data.data() {
            InterceptedData::TrieNode(_) => Ok(()),
            other => Err(ProcessorError::WrongDataType(other.type_name())),
        }
    }

    fn save(&self, data: &ValidatedData, _from: &PeerId) -> Result<(), ProcessorError> {
        let InterceptedData::TrieNode(node) = data.data() else {
            return Err(ProcessorError::WrongDataType(data.data().type_name()));
        };
        self.pool.put(*data.hash(), node.raw().to_vec());
        Ok(())
    }
}

pub struct MiniBlockInterceptorProcessor {
    pool: Arc<Cacher<MiniBlock>>,
    store: Arc<ChainStorer>,
}

impl MiniBlockInterceptorProcessor {
    pub fn new(pool: Arc<Cacher<MiniBlock>>, store: Arc<ChainStorer>) -> Self {
        Self { pool, store }
    }
}

impl InterceptorProcessor for MiniBlockInterceptorProcessor {
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError> {
        match data.data() {
            InterceptedData::MiniBlock(_) => Ok(()),
            other => Err(ProcessorError::WrongDataType(other.type_name())),
        }
    }

    fn save(&self, data: &ValidatedData, from: &PeerId) -> Result<(), ProcessorError> {
        let InterceptedData::MiniBlock(mini_block) = data.data() else {
            return Err(ProcessorError::WrongDataType(data.data().type_name()));
        };
        let hash = data.hash();
        if self.store.has(UnitType::MiniBlock, hash) {
            return Ok(());
        }
        if self.pool.put(*hash, mini_block.mini_block().clone()) {
            trace!(hash = %hex_prefix(hash), peer = %from, "received mini block");
        }
        Ok(())
    }
}

pub struct ValidatorInfoInterceptorProcessor {
    pool: Arc<Cacher<ValidatorInfo>>,
}

impl ValidatorInfoInterceptorProcessor {
    pub fn new(pool: Arc<Cacher<ValidatorInfo>>) -> Self {
        Self { pool }
    }
}

impl InterceptorProcessor for ValidatorInfoInterceptorProcessor {
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError> {
        match data.data() {
            InterceptedData::ValidatorInfo(_) => Ok(()),
            other => Err(ProcessorError::WrongDataType(other.type_name())),
        }
    }

    fn save(&self, data: &ValidatedData, _from: &PeerId) -> Result<(), ProcessorError> {
        let InterceptedData::ValidatorInfo(info) = data.data() else {
            return Err(ProcessorError::WrongDataType(data.data().type_name()));
        };
        self.pool.put(*data.hash(), info.info().clone());
        Ok(())
    }
}
