//! # Interceptors Subsystem
//!
//! Entry point for every piece of data gossiped between nodes. One
//! interceptor per topic decodes inbound messages, validates them, filters
//! out data this shard does not need and hands the rest to the data pools.
//!
//! ## Pipeline
//!
//! ```text
//! P2pMessage ──► admission ──► throttle ──► decode ──► validate
//!                (antiflood,                  │           │
//!                 blacklist)                  ▼           ▼
//!                                      blacklist peer   relevance ──► processor ──► pool
//! ```
//!
//! ## Architecture
//!
//! - **Domain Layer:** intercepted objects, their checks and error types
//! - **Ports Layer:** transport, consensus, crypto and epoch traits
//! - **Factory / Processor / Interceptor:** the per-topic pipeline stages
//! - **Container:** topic plans for shard and meta-chain nodes
//! - **Adapters Layer:** Ed25519 signatures, header signature checks,
//!   epoch notification and the request whitelist
//!
//! ## Example
//!
//! ```rust,ignore
//! let args = InterceptorsContainerFactoryArgs { /* dependencies */ ..Default::default() };
//! let container = ShardInterceptorsContainerFactory::new(args)?.create()?;
//! let interceptor = container.get("transactions_0")?;
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod config;
pub mod domain;
pub mod ports;

// =============================================================================
// PIPELINE
// =============================================================================

pub mod admission;
pub mod factory;
pub mod interceptor;
pub mod processor;

pub mod container;

// =============================================================================
// ADAPTERS
// =============================================================================

pub mod adapters;

/// Stubs and argument builders for tests.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use adapters::{CacheWhiteList, ConsensusHeaderSigVerifier, Ed25519Signer, EpochNotifier};
pub use admission::{P2pAntiflood, Throttler, TimeCacheBlacklist};
pub use config::{InterceptorsConfig, ThrottlePolicy};
pub use container::{
    InterceptorsContainer, InterceptorsContainerFactoryArgs, MetaInterceptorsContainerFactory,
    ShardInterceptorsContainerFactory,
};
pub use domain::{
    DataError, Dependency, FactoryError, InterceptedData, InterceptorError, ProcessorError,
    TopicFamily, ValidatedData,
};
pub use factory::{ArgInterceptedDataFactory, InterceptedDataFactory};
pub use interceptor::{ArgInterceptor, MultiDataInterceptor, SingleDataInterceptor};
pub use ports::{MessageProcessor, Messenger, P2pMessage};
pub use processor::InterceptorProcessor;
