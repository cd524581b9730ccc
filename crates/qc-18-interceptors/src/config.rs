//! # Interception Configuration
//!
//! All limits have sane defaults; every section deserialises from JSON with
//! missing fields falling back to those defaults.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use shared_types::{codec::DEFAULT_MAX_MESSAGE_SIZE, Marshalizer, MarshalizerKind};
use std::time::Duration;

/// Complete interception configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorsConfig {
    pub antiflood: AntifloodConfig,
    pub throttler: ThrottlerConfig,
    pub marshalizer: MarshalizerConfig,
    /// Largest accepted gap between a transaction nonce and its account nonce.
    pub max_tx_nonce_delta_allowed: u64,
    /// Epoch from which signed-with-hash transactions are accepted.
    pub enable_signed_tx_with_hash_epoch: u32,
}

impl Default for InterceptorsConfig {
    fn default() -> Self {
        Self {
            antiflood: AntifloodConfig::default(),
            throttler: ThrottlerConfig::default(),
            marshalizer: MarshalizerConfig::default(),
            max_tx_nonce_delta_allowed: 15_000,
            enable_signed_tx_with_hash_epoch: 0,
        }
    }
}

/// Antiflood limits, evaluated over one-second windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntifloodConfig {
    pub enabled: bool,
    pub peer_max_messages_per_second: u32,
    pub peer_max_total_size_per_second: u64,
    /// Cap on messages per topic across all peers.
    pub max_messages_per_second: u32,
    pub topic: TopicAntifloodConfig,
    pub black_list: BlackListConfig,
}

impl Default for AntifloodConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            peer_max_messages_per_second: 75,
            peer_max_total_size_per_second: 2 * 1024 * 1024,
            max_messages_per_second: 10_000,
            topic: TopicAntifloodConfig::default(),
            black_list: BlackListConfig::default(),
        }
    }
}

/// Per-peer, per-topic message quotas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicAntifloodConfig {
    pub default_max_messages_per_sec: u32,
    pub max_messages: Vec<TopicMaxMessagesConfig>,
}

impl Default for TopicAntifloodConfig {
    fn default() -> Self {
        Self {
            default_max_messages_per_sec: 30,
            max_messages: vec![
                TopicMaxMessagesConfig {
                    topic: "shardBlocks".to_string(),
                    num_messages_per_sec: 30,
                },
                TopicMaxMessagesConfig {
                    topic: "metachainBlocks".to_string(),
                    num_messages_per_sec: 30,
                },
            ],
        }
    }
}

/// Override for topics whose name starts with `topic`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMaxMessagesConfig {
    pub topic: String,
    pub num_messages_per_sec: u32,
}

/// When a flooding peer gets banned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackListConfig {
    pub threshold_num_messages_per_second: u32,
    pub threshold_size_per_second: u64,
    /// Consecutive flooding windows before the ban.
    pub num_flooding_rounds: u32,
    pub peer_ban_duration_in_seconds: u64,
    /// Upper bound on concurrently listed identities.
    pub max_entries: usize,
}

impl Default for BlackListConfig {
    fn default() -> Self {
        Self {
            threshold_num_messages_per_second: 150,
            threshold_size_per_second: 4 * 1024 * 1024,
            num_flooding_rounds: 10,
            peer_ban_duration_in_seconds: 300,
            max_entries: 100_000,
        }
    }
}

impl BlackListConfig {
    pub fn peer_ban_duration(&self) -> Duration {
        Duration::from_secs(self.peer_ban_duration_in_seconds)
    }
}

/// What an interceptor does when every pipeline slot is taken.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThrottlePolicy {
    /// Reject immediately.
    FailFast,
    /// Wait for a free slot, then reject.
    WaitUpTo {
        #[serde_as(as = "DurationMilliSeconds<u64>")]
        #[serde(rename = "millis")]
        timeout: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlerConfig {
    pub max_concurrent_pipelines: usize,
    pub policy: ThrottlePolicy,
}

impl Default for ThrottlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_pipelines: 100,
            policy: ThrottlePolicy::FailFast,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarshalizerConfig {
    pub kind: MarshalizerKind,
    /// Zero disables the size check.
    pub size_check_delta: u32,
    pub max_message_size: u64,
}

impl Default for MarshalizerConfig {
    fn default() -> Self {
        Self {
            kind: MarshalizerKind::Bincode,
            size_check_delta: 0,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }
}

impl MarshalizerConfig {
    pub fn build(&self) -> Marshalizer {
        Marshalizer::new(self.kind)
            .with_size_check(self.size_check_delta)
            .with_max_size(self.max_message_size)
    }
}
