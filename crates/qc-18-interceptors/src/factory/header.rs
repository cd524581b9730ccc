//! Shard and meta-chain header factory.

use super::{content_hash, ArgInterceptedDataFactory, InterceptedDataFactory};
use crate::domain::{
    DataError, FactoryError, HeaderValidationContext, InterceptedData, InterceptedHeader,
};
use shared_types::{Hasher, Header, Marshalizer, MetaBlock, ShardHeader};
use std::sync::Arc;

/// Which header type a topic carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    Shard,
    Meta,
}

pub struct InterceptedHeaderFactory {
    kind: HeaderKind,
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    ctx: Arc<HeaderValidationContext>,
}

impl InterceptedHeaderFactory {
    pub fn new(args: &ArgInterceptedDataFactory, kind: HeaderKind) -> Result<Self, FactoryError> {
        args.check()?;
        Ok(Self {
            kind,
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            ctx: Arc::new(HeaderValidationContext {
                shard_coordinator: Arc::clone(&args.shard_coordinator),
                sig_verifier: Arc::clone(&args.header_sig_verifier),
                validity_attester: Arc::clone(&args.validity_attester),
                chain_id: args.chain_id.clone(),
            }),
        })
    }

    fn decode(&self, raw: &[u8]) -> Result<Header, DataError> {
        Ok(match self.kind {
            HeaderKind::Shard => Header::Shard(self.marshalizer.unmarshal::<ShardHeader>(raw)?),
            HeaderKind::Meta => Header::Meta(self.marshalizer.unmarshal::<MetaBlock>(raw)?),
        })
    }
}

impl InterceptedDataFactory for InterceptedHeaderFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        let header = self.decode(raw)?;
        let hash = content_hash(&self.marshalizer, self.hasher.as_ref(), &header)?;
        Ok(InterceptedData::Header(InterceptedHeader::new(
            header,
            raw.to_vec(),
            hash,
            Arc::clone(&self.ctx),
        )))
    }
}
