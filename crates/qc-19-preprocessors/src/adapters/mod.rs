//! # Adapters
//!
//! - `request_handler`: forwards missing-object requests to a channel
//! - `gas`: per-transaction gas accounting
//! - `block_size`: running block size estimate

pub mod block_size;
pub mod gas;
pub mod request_handler;

pub use block_size::BlockSizeComputation;
pub use gas::GasTracker;
pub use request_handler::{ChannelRequestHandler, DataRequest};
