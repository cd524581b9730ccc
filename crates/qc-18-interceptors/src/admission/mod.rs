//! Admission control: the checks a message passes before any decoding.
//!
//! - `throttler`: global bound on concurrent pipelines
//! - `antiflood`: per-peer/topic/size rate limits
//! - `blacklist`: time-expiring bans

pub mod antiflood;
pub mod blacklist;
pub mod throttler;

pub use antiflood::P2pAntiflood;
pub use blacklist::{TimeCacheBlacklist, DEFAULT_MAX_BLACKLIST_ENTRIES, MAX_BAN_DURATION};
pub use throttler::{ThrottleGuard, Throttler};
