//! # P2P Antiflood
//!
//! Cheap pre-decode admission keyed by peer, topic and message size, over
//! fixed windows (one second in production).
//!
//! Quotas, checked in order:
//! 1. per peer: message count and total bytes
//! 2. per peer and topic: message count (default or per-topic override)
//! 3. per topic across all peers: message count
//!
//! A peer whose closed window exceeded the blacklist thresholds for
//! `num_flooding_rounds` consecutive windows is blacklisted.

use crate::config::AntifloodConfig;
use crate::ports::{AntifloodHandler, BlacklistHandler, BlacklistIdentity};
use parking_lot::Mutex;
use shared_types::PeerId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Tracked peers before stale windows are swept.
const MAX_TRACKED_PEERS: usize = 100_000;

#[derive(Debug, Clone, Copy)]
struct PeerWindow {
    window_start: Instant,
    messages: u32,
    bytes: u64,
    flooding_rounds: u32,
}

#[derive(Debug, Clone, Copy)]
struct CountWindow {
    window_start: Instant,
    messages: u32,
}

impl CountWindow {
    fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            messages: 0,
        }
    }

    /// Counts one message; returns the count in the current window.
    fn record(&mut self, now: Instant, window: Duration) -> u32 {
        if now.duration_since(self.window_start) >= window {
            self.window_start = now;
            self.messages = 0;
        }
        self.messages = self.messages.saturating_add(1);
        self.messages
    }
}

pub struct P2pAntiflood {
    config: AntifloodConfig,
    window: Duration,
    blacklist: Arc<dyn BlacklistHandler>,
    peers: Mutex<HashMap<PeerId, PeerWindow>>,
    peer_topics: Mutex<HashMap<(PeerId, String), CountWindow>>,
    topics: Mutex<HashMap<String, CountWindow>>,
}

impl P2pAntiflood {
    pub fn new(config: AntifloodConfig, blacklist: Arc<dyn BlacklistHandler>) -> Self {
        Self::with_window(config, blacklist, Duration::from_secs(1))
    }

    pub fn with_window(
        config: AntifloodConfig,
        blacklist: Arc<dyn BlacklistHandler>,
        window: Duration,
    ) -> Self {
        Self {
            config,
            window,
            blacklist,
            peers: Mutex::new(HashMap::new()),
            peer_topics: Mutex::new(HashMap::new()),
            topics: Mutex::new(HashMap::new()),
        }
    }

    /// Per-peer quota for `topic`: the first override whose name prefixes
    /// the topic, else the default.
    fn topic_quota(&self, topic: &str) -> u32 {
        self.config
            .topic
            .max_messages
            .iter()
            .find(|o| topic.starts_with(&o.topic))
            .map(|o| o.num_messages_per_sec)
            .unwrap_or(self.config.topic.default_max_messages_per_sec)
    }

    fn check_peer(&self, peer: &PeerId, size: usize, now: Instant) -> bool {
        let mut peers = self.peers.lock();
        if peers.len() >= MAX_TRACKED_PEERS && !peers.contains_key(peer) {
            let stale = self.window * 2;
            peers.retain(|_, w| now.duration_since(w.window_start) < stale);
        }

        let state = peers.entry(*peer).or_insert(PeerWindow {
            window_start: now,
            messages: 0,
            bytes: 0,
            flooding_rounds: 0,
        });

        if now.duration_since(state.window_start) >= self.window {
            self.close_window(peer, state);
            state.window_start = now;
            state.messages = 0;
            state.bytes = 0;
        }

        state.messages = state.messages.saturating_add(1);
        state.bytes = state.bytes.saturating_add(size as u64);

        state.messages <= self.config.peer_max_messages_per_second
            && state.bytes <= self.config.peer_max_total_size_per_second
    }

    fn close_window(&self, peer: &PeerId, state: &mut PeerWindow) {
        let thresholds = &self.config.black_list;
        let flooded = state.messages > thresholds.threshold_num_messages_per_second
            || state.bytes > thresholds.threshold_size_per_second;
        if !flooded {
            state.flooding_rounds = 0;
            return;
        }

        state.flooding_rounds += 1;
        if state.flooding_rounds >= thresholds.num_flooding_rounds {
            warn!(
                peer = %peer,
                messages = state.messages,
                bytes = state.bytes,
                rounds = state.flooding_rounds,
                "peer flooding, blacklisting"
            );
            self.blacklist.blacklist(
                BlacklistIdentity::Peer(*peer),
                thresholds.peer_ban_duration(),
            );
            state.flooding_rounds = 0;
        }
    }

    fn check_peer_topic(&self, peer: &PeerId, topic: &str, now: Instant) -> bool {
        let mut peer_topics = self.peer_topics.lock();
        if peer_topics.len() >= MAX_TRACKED_PEERS {
            let stale = self.window * 2;
            peer_topics.retain(|_, w| now.duration_since(w.window_start) < stale);
        }
        let count = peer_topics
            .entry((*peer, topic.to_string()))
            .or_insert_with(|| CountWindow::new(now))
            .record(now, self.window);
        count <= self.topic_quota(topic)
    }

    fn check_topic(&self, topic: &str, now: Instant) -> bool {
        let mut topics = self.topics.lock();
        let count = match topics.get_mut(topic) {
            Some(window) => window.record(now, self.window),
            None => topics
                .entry(topic.to_string())
                .or_insert_with(|| CountWindow::new(now))
                .record(now, self.window),
        };
        count <= self.config.max_messages_per_second
    }
}

impl AntifloodHandler for P2pAntiflood {
    fn can_process_message(&self, peer: &PeerId, topic: &str, size: usize) -> bool {
        if !self.config.enabled {
            return true;
        }
        let now = Instant::now();

        if !self.check_peer(peer, size, now) {
            trace!(peer = %peer, topic, size, "peer quota exceeded");
            return false;
        }
        if !self.check_peer_topic(peer, topic, now) {
            trace!(peer = %peer, topic, "peer topic quota exceeded");
            return false;
        }
        if !self.check_topic(topic, now) {
            trace!(topic, "topic quota exceeded");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::TimeCacheBlacklist;
    use crate::config::{BlackListConfig, TopicAntifloodConfig, TopicMaxMessagesConfig};
    use std::thread;

    fn config() -> AntifloodConfig {
        AntifloodConfig {
            enabled: true,
            peer_max_messages_per_second: 5,
            peer_max_total_size_per_second: 1_000,
            max_messages_per_second: 100,
            topic: TopicAntifloodConfig {
                default_max_messages_per_sec: 3,
                max_messages: vec![TopicMaxMessagesConfig {
                    topic: "shardBlocks".into(),
                    num_messages_per_sec: 1,
                }],
            },
            black_list: BlackListConfig {
                threshold_num_messages_per_second: 8,
                threshold_size_per_second: 10_000,
                num_flooding_rounds: 2,
                peer_ban_duration_in_seconds: 60,
                max_entries: 100,
            },
        }
    }

    fn peer(byte: u8) -> PeerId {
        PeerId::new([byte; 32])
    }

    fn antiflood(window: Duration) -> (P2pAntiflood, Arc<TimeCacheBlacklist>) {
        let blacklist = Arc::new(TimeCacheBlacklist::new(100));
        let antiflood = P2pAntiflood::with_window(config(), blacklist.clone(), window);
        (antiflood, blacklist)
    }

    #[test]
    fn test_peer_message_quota() {
        let (antiflood, _) = antiflood(Duration::from_secs(60));
        let topics = ["a", "b", "c", "d", "e", "f"];
        let accepted = topics
            .iter()
            .filter(|t| antiflood.can_process_message(&peer(1), t, 10))
            .count();
        assert_eq!(accepted, 5);
        // Other peers are unaffected.
        assert!(antiflood.can_process_message(&peer(2), "a", 10));
    }

    #[test]
    fn test_peer_size_quota() {
        let (antiflood, _) = antiflood(Duration::from_secs(60));
        assert!(antiflood.can_process_message(&peer(1), "a", 600));
        assert!(!antiflood.can_process_message(&peer(1), "b", 600));
    }

    #[test]
    fn test_topic_override_by_prefix() {
        let (antiflood, _) = antiflood(Duration::from_secs(60));
        assert!(antiflood.can_process_message(&peer(1), "shardBlocks_0_1", 1));
        assert!(!antiflood.can_process_message(&peer(1), "shardBlocks_0_1", 1));

        assert!(antiflood.can_process_message(&peer(2), "transactions_0", 1));
        assert!(antiflood.can_process_message(&peer(2), "transactions_0", 1));
        assert!(antiflood.can_process_message(&peer(2), "transactions_0", 1));
        assert!(!antiflood.can_process_message(&peer(2), "transactions_0", 1));
    }

    #[test]
    fn test_window_reset_restores_quota() {
        let (antiflood, _) = antiflood(Duration::from_millis(20));
        for _ in 0..3 {
            antiflood.can_process_message(&peer(1), "t", 1);
        }
        assert!(!antiflood.can_process_message(&peer(1), "t", 1));
        thread::sleep(Duration::from_millis(30));
        assert!(antiflood.can_process_message(&peer(1), "t", 1));
    }

    #[test]
    fn test_consecutive_flooding_rounds_blacklist_peer() {
        let (antiflood, blacklist) = antiflood(Duration::from_millis(20));
        let flooder = BlacklistIdentity::Peer(peer(9));

        for round in 0..2 {
            for _ in 0..20 {
                antiflood.can_process_message(&peer(9), "t", 1);
            }
            assert!(!blacklist.is_blacklisted(&flooder), "round {round}");
            thread::sleep(Duration::from_millis(30));
        }

        // First message of the next window closes the second flooding window.
        antiflood.can_process_message(&peer(9), "t", 1);
        assert!(blacklist.is_blacklisted(&flooder));
    }

    #[test]
    fn test_quiet_window_resets_flooding_rounds() {
        let (antiflood, blacklist) = antiflood(Duration::from_millis(20));

        for _ in 0..20 {
            antiflood.can_process_message(&peer(9), "t", 1);
        }
        thread::sleep(Duration::from_millis(30));
        antiflood.can_process_message(&peer(9), "t", 1);
        thread::sleep(Duration::from_millis(30));
        for _ in 0..20 {
            antiflood.can_process_message(&peer(9), "t", 1);
        }
        thread::sleep(Duration::from_millis(30));
        antiflood.can_process_message(&peer(9), "t", 1);

        assert!(!blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(9))));
    }

    #[test]
    fn test_disabled_accepts_everything() {
        let blacklist = Arc::new(TimeCacheBlacklist::new(10));
        let antiflood = P2pAntiflood::new(
            AntifloodConfig {
                enabled: false,
                ..config()
            },
            blacklist,
        );
        for _ in 0..100 {
            assert!(antiflood.can_process_message(&peer(1), "t", 1_000_000));
        }
    }
}
