//! # Time-Expiring Blacklist
//!
//! Identities (peers, topics, content hashes) barred until an expiry
//! instant. Bounded: when full, expired entries are swept first, then the
//! entry closest to expiry is evicted.

use crate::ports::{BlacklistHandler, BlacklistIdentity};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default maximum number of listed identities.
pub const DEFAULT_MAX_BLACKLIST_ENTRIES: usize = 100_000;

/// Longest ban applied; configured durations above it are clamped.
pub const MAX_BAN_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug)]
pub struct TimeCacheBlacklist {
    /// Map of identity -> expiry instant
    entries: RwLock<HashMap<BlacklistIdentity, Instant>>,
    max_entries: usize,
}

impl TimeCacheBlacklist {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Number of entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops expired entries.
    pub fn sweep(&self) {
        let now = Instant::now();
        self.entries.write().retain(|_, expiry| *expiry > now);
    }
}

impl Default for TimeCacheBlacklist {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLACKLIST_ENTRIES)
    }
}

impl BlacklistHandler for TimeCacheBlacklist {
    fn is_blacklisted(&self, identity: &BlacklistIdentity) -> bool {
        self.entries
            .read()
            .get(identity)
            .is_some_and(|expiry| *expiry > Instant::now())
    }

    fn blacklist(&self, identity: BlacklistIdentity, duration: Duration) {
        let now = Instant::now();
        let Some(expiry) = now.checked_add(duration.min(MAX_BAN_DURATION)) else {
            warn!(identity = %identity, "ban expiry not representable, identity not listed");
            return;
        };
        let mut entries = self.entries.write();

        if !entries.contains_key(&identity) && entries.len() >= self.max_entries {
            entries.retain(|_, exp| *exp > now);
            if entries.len() >= self.max_entries {
                let soonest = entries
                    .iter()
                    .min_by_key(|(_, exp)| **exp)
                    .map(|(id, _)| id.clone());
                if let Some(soonest) = soonest {
                    entries.remove(&soonest);
                }
            }
        }

        let slot = entries.entry(identity.clone()).or_insert(expiry);
        if *slot < expiry {
            *slot = expiry;
        }
        debug!(identity = %identity, duration_secs = duration.as_secs(), "identity blacklisted");
    }
}
