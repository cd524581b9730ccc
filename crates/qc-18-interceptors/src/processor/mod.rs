//! # Interceptor Processors
//!
//! Last stage of a pipeline: a processor receives `ValidatedData`, runs its
//! pool-specific checks, then inserts into the pool keyed by content hash.
//! Insertion is idempotent; a duplicate is a silent no-op.

pub mod header;
pub mod structural;
pub mod transaction;
pub mod tx_validator;

pub use header::{HdrInterceptorProcessor, NilHeaderValidator};
pub use structural::{
    MiniBlockInterceptorProcessor, TrieNodeInterceptorProcessor,
    ValidatorInfoInterceptorProcessor,
};
pub use transaction::{PooledTransaction, TxInterceptorProcessor};
pub use tx_validator::{AccountTxValidator, NilTxValidator, TxValidator};

use crate::domain::{ProcessorError, ValidatedData};
use shared_types::PeerId;

/// Pool-side acceptance of validated data.
pub trait InterceptorProcessor: Send + Sync {
    /// Checks that depend on pool or chain state.
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError>;

    /// Inserts into the pool. Saving an already present hash succeeds.
    fn save(&self, data: &ValidatedData, from: &PeerId) -> Result<(), ProcessorError>;
}
