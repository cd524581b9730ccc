//! Shared container-building routine.
//!
//! A container is described by a `TopicPlan`: for each topic family, the
//! range of destination shards it is wired for. `build_container` walks the
//! plan, builds one interceptor per topic, and registers it.

use super::args::ResolvedArgs;
use super::InterceptorsContainer;
use crate::admission::Throttler;
use crate::domain::{FactoryError, TopicFamily};
use crate::factory::{
    HeaderKind, InterceptedDataFactory, InterceptedHeaderFactory, InterceptedMiniBlockFactory,
    InterceptedRewardTxFactory, InterceptedTrieNodeFactory, InterceptedTxFactory,
    InterceptedUnsignedTxFactory,
};
use crate::interceptor::{ArgInterceptor, MultiDataInterceptor, SingleDataInterceptor};
use crate::ports::MessageProcessor;
use crate::processor::{
    AccountTxValidator, HdrInterceptorProcessor, InterceptorProcessor,
    MiniBlockInterceptorProcessor, NilTxValidator, TrieNodeInterceptorProcessor,
    TxInterceptorProcessor,
};
use shared_types::{ShardCoordinator, ShardId, METACHAIN_SHARD_ID};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Destination shards a family is wired for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShardRange {
    /// No destination: the family's bare base name.
    Global,
    /// Every shard `0..N`.
    AllShards,
    /// Every shard `0..N` plus the meta-chain.
    AllShardsAndMeta,
    /// Every shard except this one, plus the meta-chain.
    PeerShardsAndMeta,
    /// Only the meta-chain.
    MetaOnly,
}

impl ShardRange {
    fn destinations(self, number_of_shards: u32, self_id: ShardId) -> Vec<ShardId> {
        match self {
            ShardRange::Global => Vec::new(),
            ShardRange::AllShards => (0..number_of_shards).collect(),
            ShardRange::AllShardsAndMeta => (0..number_of_shards)
                .chain(std::iter::once(METACHAIN_SHARD_ID))
                .collect(),
            ShardRange::PeerShardsAndMeta => (0..number_of_shards)
                .filter(|&shard| shard != self_id)
                .chain(std::iter::once(METACHAIN_SHARD_ID))
                .collect(),
            ShardRange::MetaOnly => vec![METACHAIN_SHARD_ID],
        }
    }
}

/// Families and the shard range each is wired for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPlan(pub Vec<(TopicFamily, ShardRange)>);

impl TopicPlan {
    /// Every (family, topic) pair of the plan, in plan order.
    pub fn topics(&self, coordinator: &ShardCoordinator) -> Vec<(TopicFamily, String)> {
        let mut topics = Vec::new();
        for &(family, range) in &self.0 {
            if range == ShardRange::Global {
                topics.push((family, family.base_name().to_string()));
                continue;
            }
            for destination in range.destinations(coordinator.number_of_shards(), coordinator.self_id())
            {
                let identifier = coordinator.communication_identifier(destination);
                topics.push((family, family.topic_with(&identifier)));
            }
        }
        topics
    }
}

/// Factory and processor shared by every topic of one family.
struct FamilyComponents {
    factory: Arc<dyn InterceptedDataFactory>,
    processor: Arc<dyn InterceptorProcessor>,
}

fn family_components(
    args: &ResolvedArgs,
    family: TopicFamily,
) -> Result<FamilyComponents, FactoryError> {
    let data_args = args.data_factory_args();
    let pools = &args.data_pool;

    let header_processor = || -> Arc<dyn InterceptorProcessor> {
        Arc::new(HdrInterceptorProcessor::new(
            Arc::clone(&pools.headers),
            Arc::clone(&args.store),
            Arc::clone(&args.blacklist),
            Arc::clone(&args.header_validator),
        ))
    };

    let components = match family {
        TopicFamily::MetachainBlocks => FamilyComponents {
            factory: Arc::new(InterceptedHeaderFactory::new(&data_args, HeaderKind::Meta)?),
            processor: header_processor(),
        },
        TopicFamily::ShardBlocks => FamilyComponents {
            factory: Arc::new(InterceptedHeaderFactory::new(&data_args, HeaderKind::Shard)?),
            processor: header_processor(),
        },
        TopicFamily::Transactions => FamilyComponents {
            factory: Arc::new(InterceptedTxFactory::new(&data_args)?),
            processor: Arc::new(TxInterceptorProcessor::new(
                Arc::clone(&pools.transactions),
                Arc::new(AccountTxValidator::new(
                    Arc::clone(&args.accounts),
                    Arc::clone(&args.shard_coordinator),
                    args.config.max_tx_nonce_delta_allowed,
                )),
            )),
        },
        TopicFamily::UnsignedTransactions => FamilyComponents {
            factory: Arc::new(InterceptedUnsignedTxFactory::new(&data_args)?),
            processor: Arc::new(TxInterceptorProcessor::new(
                Arc::clone(&pools.unsigned_transactions),
                Arc::new(NilTxValidator),
            )),
        },
        TopicFamily::RewardTransactions => FamilyComponents {
            factory: Arc::new(InterceptedRewardTxFactory::new(&data_args)?),
            processor: Arc::new(TxInterceptorProcessor::new(
                Arc::clone(&pools.reward_transactions),
                Arc::new(NilTxValidator),
            )),
        },
        TopicFamily::MiniBlocks => FamilyComponents {
            factory: Arc::new(InterceptedMiniBlockFactory::new(&data_args)),
            processor: Arc::new(MiniBlockInterceptorProcessor::new(
                Arc::clone(&pools.mini_blocks),
                Arc::clone(&args.store),
            )),
        },
        TopicFamily::AccountTrieNodes | TopicFamily::ValidatorTrieNodes => FamilyComponents {
            factory: Arc::new(InterceptedTrieNodeFactory::new(&data_args)),
            processor: Arc::new(TrieNodeInterceptorProcessor::new(Arc::clone(
                &pools.trie_nodes,
            ))),
        },
    };
    Ok(components)
}

fn build_interceptor(
    args: &ResolvedArgs,
    family: TopicFamily,
    topic: &str,
    components: &FamilyComponents,
    throttler: &Arc<Throttler>,
) -> Result<Arc<dyn MessageProcessor>, FactoryError> {
    let interceptor_args = ArgInterceptor {
        topic: topic.to_string(),
        factory: Arc::clone(&components.factory),
        processor: Arc::clone(&components.processor),
        throttler: Arc::clone(throttler),
        antiflood: Arc::clone(&args.antiflood),
        blacklist: Arc::clone(&args.blacklist),
        whitelist: Arc::clone(&args.whitelist),
        peer_ban_duration: args.config.antiflood.black_list.peer_ban_duration(),
    };
    if family.is_batched() {
        Ok(Arc::new(MultiDataInterceptor::new(
            interceptor_args,
            args.marshalizer.clone(),
        )?))
    } else {
        Ok(Arc::new(SingleDataInterceptor::new(interceptor_args)?))
    }
}

/// Builds and wires every topic of `plan`. All-or-nothing.
pub(crate) fn build_container(
    args: &ResolvedArgs,
    plan: &TopicPlan,
) -> Result<InterceptorsContainer, FactoryError> {
    let throttler = Arc::new(Throttler::from_config(&args.config.throttler)?);
    let mut container = InterceptorsContainer::new();
    let mut registered: Vec<String> = Vec::new();

    let result = wire_topics(args, plan, &throttler, &mut container, &mut registered);
    if let Err(e) = result {
        warn!(error = %e, registered = registered.len(), "interceptors container failed, rolling back");
        for topic in &registered {
            if let Err(unregister_error) = args.messenger.unregister_message_processor(topic) {
                debug!(topic = %topic, error = %unregister_error, "rollback unregister failed");
            }
        }
        return Err(e);
    }

    info!(
        shard = args.shard_coordinator.self_id(),
        shards = args.shard_coordinator.number_of_shards(),
        topics = container.len(),
        "interceptors container created"
    );
    Ok(container)
}

fn wire_topics(
    args: &ResolvedArgs,
    plan: &TopicPlan,
    throttler: &Arc<Throttler>,
    container: &mut InterceptorsContainer,
    registered: &mut Vec<String>,
) -> Result<(), FactoryError> {
    let mut components: Vec<(TopicFamily, FamilyComponents)> = Vec::new();

    for (family, topic) in plan.topics(&args.shard_coordinator) {
        let index = match components.iter().position(|(f, _)| *f == family) {
            Some(index) => index,
            None => {
                components.push((family, family_components(args, family)?));
                components.len() - 1
            }
        };
        let interceptor = build_interceptor(args, family, &topic, &components[index].1, throttler)?;

        container.add(topic.clone(), Arc::clone(&interceptor))?;
        if !args.messenger.has_topic(&topic) {
            args.messenger.create_topic(&topic, true)?;
        }
        args.messenger
            .register_message_processor(&topic, interceptor)?;
        registered.push(topic.clone());
        debug!(topic = %topic, family = %family, "interceptor registered");
    }
    Ok(())
}
