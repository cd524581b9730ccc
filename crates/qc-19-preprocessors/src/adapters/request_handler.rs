//! Request handler backed by a bounded tokio channel.
//!
//! Requests are fire-and-forget: the pre-processors never block on the
//! resolver side. When the channel is full the request is dropped and
//! counted; the pre-processor will time out and the block is retried.

use crate::ports::RequestHandler;
use shared_types::{Hash, ShardId};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{trace, warn};

/// One request for objects missing from the pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRequest {
    Transactions { shard_id: ShardId, hashes: Vec<Hash> },
    UnsignedTransactions { shard_id: ShardId, hashes: Vec<Hash> },
    RewardTransactions { shard_id: ShardId, hashes: Vec<Hash> },
}

pub struct ChannelRequestHandler {
    sender: mpsc::Sender<DataRequest>,
    dropped: AtomicU64,
}

impl ChannelRequestHandler {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DataRequest>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                dropped: AtomicU64::new(0),
            },
            receiver,
        )
    }

    /// Requests lost because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn send(&self, hashes: &[Hash], build: impl FnOnce(Vec<Hash>) -> DataRequest) {
        if hashes.is_empty() {
            return;
        }
        let request = build(hashes.to_vec());
        trace!(?request, "requesting missing objects");
        match self.sender.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(request)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(?request, "request channel full, dropping request");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("request channel closed");
            }
        }
    }
}

impl RequestHandler for ChannelRequestHandler {
    fn request_transaction(&self, shard_id: ShardId, hashes: &[Hash]) {
        self.send(hashes, |hashes| DataRequest::Transactions { shard_id, hashes });
    }

    fn request_unsigned_transactions(&self, shard_id: ShardId, hashes: &[Hash]) {
        self.send(hashes, |hashes| DataRequest::UnsignedTransactions { shard_id, hashes });
    }

    fn request_reward_transactions(&self, shard_id: ShardId, hashes: &[Hash]) {
        self.send(hashes, |hashes| DataRequest::RewardTransactions { shard_id, hashes });
    }
}
