//! # Domain Layer - Interceptors Subsystem
//!
//! ## Components
//!
//! - `intercepted`: `InterceptedData` variants and the `ValidatedData` wrapper
//! - `transaction`, `results`, `header`, `trie_node`, `mini_block`,
//!   `validator_info`: per-category decoded objects and their checks
//! - `topics`: gossip topic families
//! - `version`: transaction version rules
//! - `epoch_flag`: epoch-activated feature flags
//! - `errors`: error enumerations

pub mod epoch_flag;
pub mod errors;
pub mod header;
pub mod intercepted;
pub mod mini_block;
pub mod results;
pub mod topics;
pub mod transaction;
pub mod trie_node;
pub mod validator_info;
pub mod version;

pub use epoch_flag::EpochFeatureFlag;
pub use errors::*;
pub use header::{HeaderValidationContext, InterceptedHeader};
pub use intercepted::{InterceptedData, InterceptedObject, InterceptedTxHandler, ValidatedData};
pub use mini_block::InterceptedMiniBlock;
pub use results::{
    InterceptedRewardTransaction, InterceptedUnsignedTransaction, ResultValidationContext,
};
pub use topics::TopicFamily;
pub use transaction::{tx_signing_payload, InterceptedTransaction, TxValidationContext};
pub use trie_node::InterceptedTrieNode;
pub use validator_info::InterceptedValidatorInfo;
pub use version::{TxVersionChecker, MASK_SIGNED_WITH_HASH};
