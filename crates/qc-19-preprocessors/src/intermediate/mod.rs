//! # Intermediate Processors
//!
//! Collect results produced while executing a block, to be carried by the
//! block's cross-shard and fee sections.
//!
//! - `IntermediateResultsProcessor`: smart-contract results for other shards
//! - `TxFeeCollector`: block fees, split between leader and burn address

pub mod fee;
pub mod results;

pub use fee::TxFeeCollector;
pub use results::IntermediateResultsProcessor;

use crate::ports::SpecialAddressHandler;
use shared_types::{ChainStorer, Hasher, Marshalizer, PubkeyConverter, ShardCoordinator};
use std::sync::Arc;

/// Dependencies of the intermediate processors, every one present.
#[derive(Clone)]
pub struct ArgIntermediateProcessor {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub marshalizer: Marshalizer,
    pub hasher: Arc<dyn Hasher>,
    pub address_pubkey_converter: Arc<dyn PubkeyConverter>,
    pub special_address_handler: Arc<dyn SpecialAddressHandler>,
    pub store: Arc<ChainStorer>,
}
