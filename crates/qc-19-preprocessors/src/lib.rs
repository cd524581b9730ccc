//! # Block Pre-processing Subsystem
//!
//! Turns pooled objects into block sections and back. Each block section
//! (`BlockType`) has one pre-processor that gathers the objects a block
//! references, requests the missing ones from peers, executes them and
//! moves them from the pools to storage once the block is committed.
//! Intermediate processors collect what executing a block produces:
//! smart-contract results bound for other shards and the block's fees.
//!
//! ## Block flow
//!
//! ```text
//! Body ──► request_block_transactions ──► is_data_prepared ──► process_block_transactions
//!              │ missing hashes                 ▲
//!              ▼                                │ pool insert handlers
//!        RequestHandler ─────► peers ─────► interceptors ──► pools
//! ```
//!
//! ## Architecture
//!
//! - **Domain Layer:** block object kinds, fee shares and error types
//! - **Ports Layer:** pre-processor APIs, execution engines and block limits
//! - **Preprocess / Intermediate:** one processor per block section
//! - **Container:** block type → processor registries and their factories
//! - **Adapters Layer:** channel request handler, gas and block size tracking
//!
//! ## Example
//!
//! ```rust,ignore
//! let args = PreProcessorsContainerFactoryArgs { /* dependencies */ ..Default::default() };
//! let container = PreProcessorsContainerFactory::new(args)?.create()?;
//! let txs = container.get(BlockType::TxBlock)?;
//! let requested = txs.request_block_transactions(&body);
//! txs.is_data_prepared(requested, Duration::from_secs(2))?;
//! ```

// =============================================================================
// CORE MODULES
// =============================================================================

pub mod domain;
pub mod ports;

// =============================================================================
// PROCESSORS
// =============================================================================

pub mod intermediate;
pub mod preprocess;

pub mod container;

// =============================================================================
// ADAPTERS
// =============================================================================

pub mod adapters;

/// Stub engines, request recorder and argument builders for tests.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use adapters::{BlockSizeComputation, ChannelRequestHandler, DataRequest, GasTracker};
pub use container::{
    IntermediateProcessorsContainer, IntermediateProcessorsContainerFactory,
    IntermediateProcessorsContainerFactoryArgs, PreProcessorsContainer,
    PreProcessorsContainerFactory, PreProcessorsContainerFactoryArgs,
};
pub use domain::{BlockTransaction, Dependency, FactoryError, FeeTransaction, PreprocessError};
pub use intermediate::{ArgIntermediateProcessor, IntermediateResultsProcessor, TxFeeCollector};
pub use ports::{IntermediateProcessor, PreProcessor, RequestHandler};
pub use preprocess::{
    ArgPreProcessor, RewardTxPreprocessor, SmartContractResultPreprocessor,
    TransactionPreprocessor, ValidatorInfoPreprocessor,
};
