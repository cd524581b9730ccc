//! # Domain Layer - Block Pre-processing
//!
//! - `block_tx`: the pooled object kinds a block body references
//! - `fee_tx`: fee shares emitted by the fee collector
//! - `errors`: error enumerations

pub mod block_tx;
pub mod errors;
pub mod fee_tx;

pub use block_tx::{BlockTransaction, BlockTxKind};
pub use errors::*;
pub use fee_tx::FeeTransaction;
