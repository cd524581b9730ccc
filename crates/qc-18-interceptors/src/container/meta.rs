//! Interceptors container factory for meta-chain nodes.

use super::args::{InterceptorsContainerFactoryArgs, ResolvedArgs};
use super::base::{build_container, ShardRange, TopicPlan};
use super::InterceptorsContainer;
use crate::domain::{FactoryError, TopicFamily};
use shared_types::METACHAIN_SHARD_ID;

pub struct MetaInterceptorsContainerFactory {
    args: ResolvedArgs,
}

impl MetaInterceptorsContainerFactory {
    /// Resolves every dependency; the shard coordinator must belong to the
    /// meta-chain.
    pub fn new(args: InterceptorsContainerFactoryArgs) -> Result<Self, FactoryError> {
        let args = args.resolve()?;
        if args.shard_coordinator.self_id() != METACHAIN_SHARD_ID {
            return Err(FactoryError::InvalidShardCoordinator);
        }
        Ok(Self { args })
    }

    /// The meta-chain notarises every shard, so it hears all of them.
    pub fn plan() -> TopicPlan {
        TopicPlan(vec![
            (TopicFamily::MetachainBlocks, ShardRange::Global),
            (TopicFamily::ShardBlocks, ShardRange::AllShards),
            (TopicFamily::Transactions, ShardRange::AllShardsAndMeta),
            (TopicFamily::UnsignedTransactions, ShardRange::AllShardsAndMeta),
            (TopicFamily::RewardTransactions, ShardRange::AllShards),
            (TopicFamily::MiniBlocks, ShardRange::AllShardsAndMeta),
            (TopicFamily::AccountTrieNodes, ShardRange::AllShardsAndMeta),
            (TopicFamily::ValidatorTrieNodes, ShardRange::AllShardsAndMeta),
        ])
    }

    pub fn create(&self) -> Result<InterceptorsContainer, FactoryError> {
        build_container(&self.args, &Self::plan())
    }
}
