//! Header processor.

use super::InterceptorProcessor;
use crate::domain::intercepted::hex_prefix;
use crate::domain::{InterceptedData, ProcessorError, ValidatedData};
use crate::ports::{BlacklistHandler, BlacklistIdentity, HeaderValidator};
use shared_types::{ChainStorer, Hash, Header, HeadersPool, PeerId, UnitType};
use std::sync::Arc;
use tracing::{debug, trace};

/// Accepts every header; nonce and finality checks happen at block
/// processing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NilHeaderValidator;

impl HeaderValidator for NilHeaderValidator {
    fn header_validate(&self, _header: &Header, _hash: &Hash) -> Result<(), ProcessorError> {
        Ok(())
    }
}

pub struct HdrInterceptorProcessor {
    headers: Arc<HeadersPool>,
    store: Arc<ChainStorer>,
    blacklist: Arc<dyn BlacklistHandler>,
    validator: Arc<dyn HeaderValidator>,
}

impl HdrInterceptorProcessor {
    pub fn new(
        headers: Arc<HeadersPool>,
        store: Arc<ChainStorer>,
        blacklist: Arc<dyn BlacklistHandler>,
        validator: Arc<dyn HeaderValidator>,
    ) -> Self {
        Self {
            headers,
            store,
            blacklist,
            validator,
        }
    }

    fn header(data: &ValidatedData) -> Result<&Header, ProcessorError> {
        match data.data() {
            InterceptedData::Header(h) => Ok(h.header()),
            other => Err(ProcessorError::WrongDataType(other.type_name())),
        }
    }

    fn storage_unit(header: &Header) -> UnitType {
        match header {
            Header::Shard(_) => UnitType::ShardHeader,
            Header::Meta(_) => UnitType::MetaBlock,
        }
    }
}

impl InterceptorProcessor for HdrInterceptorProcessor {
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError> {
        let header = Self::header(data)?;
        let hash = data.hash();
        if self
            .blacklist
            .is_blacklisted(&BlacklistIdentity::Hash(*hash))
        {
            return Err(ProcessorError::BlacklistedHeader(*hash));
        }
        self.validator.header_validate(header, hash)
    }

    fn save(&self, data: &ValidatedData, from: &PeerId) -> Result<(), ProcessorError> {
        let header = Self::header(data)?;
        let hash = *data.hash();
        if self.store.has(Self::storage_unit(header), &hash) {
            trace!(hash = %hex_prefix(&hash), "header already in storage");
            return Ok(());
        }
        if self.headers.add_header(hash, header.clone()) {
            debug!(
                hash = %hex_prefix(&hash),
                shard = header.shard_id(),
                nonce = header.nonce(),
                peer = %from,
                "received header"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::TimeCacheBlacklist;
    use crate::mocks::validated_header;
    use std::time::Duration;

    fn processor(blacklist: Arc<TimeCacheBlacklist>) -> (HdrInterceptorProcessor, Arc<HeadersPool>) {
        let headers = Arc::new(HeadersPool::new(10));
        let processor = HdrInterceptorProcessor::new(
            headers.clone(),
            Arc::new(ChainStorer::in_memory()),
            blacklist,
            Arc::new(NilHeaderValidator),
        );
        (processor, headers)
    }

    #[test]
    fn test_save_is_idempotent() {
        let (processor, headers) = processor(Arc::new(TimeCacheBlacklist::default()));
        let data = validated_header(1);

        processor.validate(&data).unwrap();
        processor.save(&data, &PeerId::default()).unwrap();
        processor.save(&data, &PeerId::default()).unwrap();
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_blacklisted_hash_rejected() {
        let blacklist = Arc::new(TimeCacheBlacklist::default());
        let (processor, _) = processor(blacklist.clone());
        let data = validated_header(1);
        blacklist.blacklist(BlacklistIdentity::Hash(*data.hash()), Duration::from_secs(60));

        assert_eq!(
            processor.validate(&data),
            Err(ProcessorError::BlacklistedHeader(*data.hash()))
        );
    }

    #[test]
    fn test_stored_header_not_pooled_again() {
        let headers = Arc::new(HeadersPool::new(10));
        let store = Arc::new(ChainStorer::in_memory());
        let data = validated_header(1);
        store
            .put(UnitType::ShardHeader, data.hash(), vec![1])
            .unwrap();
        let processor = HdrInterceptorProcessor::new(
            headers.clone(),
            store,
            Arc::new(TimeCacheBlacklist::default()),
            Arc::new(NilHeaderValidator),
        );

        processor.save(&data, &PeerId::default()).unwrap();
        assert!(headers.is_empty());
    }
}
