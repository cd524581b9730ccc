//! # Interceptors
//!
//! One interceptor per gossip topic, registered with the messenger as its
//! `MessageProcessor`.
//!
//! ## Pipeline
//!
//! ```text
//! message ─→ topic/blacklist/antiflood ─→ throttle ─→ decode ─→ validate
//!                                                               │
//!                     pool ←─ processor.save ←─ processor.validate ←─ relevance
//! ```
//!
//! Admission runs before any decoding. The throttle slot is held by a
//! guard, so it is returned on every exit path. Decode and validation
//! failures attributable to the sender get the peer blacklisted.

pub mod multi;
pub mod single;

pub use multi::MultiDataInterceptor;
pub use single::SingleDataInterceptor;

use crate::admission::Throttler;
use crate::domain::{DataError, FactoryError, InterceptorError, ValidatedData};
use crate::domain::intercepted::hex_prefix;
use crate::factory::InterceptedDataFactory;
use crate::ports::{
    AntifloodHandler, BlacklistHandler, BlacklistIdentity, P2pMessage, WhiteListHandler,
};
use crate::processor::InterceptorProcessor;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Everything one interceptor needs.
#[derive(Clone)]
pub struct ArgInterceptor {
    pub topic: String,
    pub factory: Arc<dyn InterceptedDataFactory>,
    pub processor: Arc<dyn InterceptorProcessor>,
    pub throttler: Arc<Throttler>,
    pub antiflood: Arc<dyn AntifloodHandler>,
    pub blacklist: Arc<dyn BlacklistHandler>,
    pub whitelist: Arc<dyn WhiteListHandler>,
    /// How long a peer sending invalid data is barred.
    pub peer_ban_duration: Duration,
}

/// Steps shared by single and multi-data interceptors.
struct InterceptorBase {
    args: ArgInterceptor,
}

impl InterceptorBase {
    fn new(args: ArgInterceptor) -> Result<Self, FactoryError> {
        if args.topic.is_empty() {
            return Err(FactoryError::EmptyTopic);
        }
        Ok(Self { args })
    }

    /// Cheap checks that run before a throttle slot is taken.
    fn admit(&self, message: &P2pMessage) -> Result<(), InterceptorError> {
        if message.topic != self.args.topic {
            return Err(InterceptorError::TopicMismatch {
                expected: self.args.topic.clone(),
                received: message.topic.clone(),
            });
        }
        if self
            .args
            .blacklist
            .is_blacklisted(&BlacklistIdentity::Peer(message.peer))
            || self
                .args
                .blacklist
                .is_blacklisted(&BlacklistIdentity::Topic(message.topic.clone()))
        {
            trace!(topic = %message.topic, peer = %message.peer, "blacklisted, dropping");
            return Err(InterceptorError::Blacklisted);
        }
        if !self
            .args
            .antiflood
            .can_process_message(&message.peer, &message.topic, message.data.len())
        {
            return Err(InterceptorError::FloodRejected);
        }
        if message.data.is_empty() {
            return Err(InterceptorError::EmptyMessage);
        }
        Ok(())
    }

    /// Logs a decode or validation failure and bans the sender when the
    /// failure is theirs.
    fn reject(&self, message: &P2pMessage, error: DataError) -> InterceptorError {
        if error.is_blacklistable() {
            warn!(
                topic = %message.topic,
                peer = %message.peer,
                error = %error,
                "invalid data, blacklisting peer"
            );
            self.args.blacklist.blacklist(
                BlacklistIdentity::Peer(message.peer),
                self.args.peer_ban_duration,
            );
        } else {
            debug!(topic = %message.topic, peer = %message.peer, error = %error, "data rejected");
        }
        InterceptorError::Data(error)
    }

    /// Valid data for other shards is dropped unless this node asked for it.
    fn is_relevant(&self, data: &ValidatedData) -> bool {
        if data.is_for_current_shard() || self.args.whitelist.is_white_listed(data.hash()) {
            return true;
        }
        trace!(
            topic = %self.args.topic,
            hash = %hex_prefix(data.hash()),
            "intercepted data is for other shard"
        );
        false
    }
}
