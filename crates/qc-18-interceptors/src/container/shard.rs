//! Interceptors container factory for shard nodes.

use super::args::{InterceptorsContainerFactoryArgs, ResolvedArgs};
use super::base::{build_container, ShardRange, TopicPlan};
use super::InterceptorsContainer;
use crate::domain::{FactoryError, TopicFamily};

pub struct ShardInterceptorsContainerFactory {
    args: ResolvedArgs,
}

impl ShardInterceptorsContainerFactory {
    /// Resolves every dependency; nothing is wired yet.
    pub fn new(args: InterceptorsContainerFactoryArgs) -> Result<Self, FactoryError> {
        let args = args.resolve()?;
        if args.shard_coordinator.is_metachain() {
            return Err(FactoryError::InvalidShardCoordinator);
        }
        Ok(Self { args })
    }

    /// Rewards originate on the meta-chain only; shard blocks are heard
    /// from peer shards and from the meta-chain notarising this shard.
    pub fn plan() -> TopicPlan {
        TopicPlan(vec![
            (TopicFamily::MetachainBlocks, ShardRange::Global),
            (TopicFamily::ShardBlocks, ShardRange::PeerShardsAndMeta),
            (TopicFamily::Transactions, ShardRange::AllShardsAndMeta),
            (TopicFamily::UnsignedTransactions, ShardRange::AllShardsAndMeta),
            (TopicFamily::RewardTransactions, ShardRange::MetaOnly),
            (TopicFamily::MiniBlocks, ShardRange::AllShardsAndMeta),
            (TopicFamily::AccountTrieNodes, ShardRange::AllShardsAndMeta),
            (TopicFamily::ValidatorTrieNodes, ShardRange::AllShardsAndMeta),
        ])
    }

    pub fn create(&self) -> Result<InterceptorsContainer, FactoryError> {
        build_container(&self.args, &Self::plan())
    }
}
