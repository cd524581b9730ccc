//! # Shard Coordinator
//!
//! Maps addresses to shards and derives the communication identifiers used
//! to suffix gossip topic names.

use crate::entities::{ShardId, METACHAIN_SHARD_ID};
use crate::errors::ShardError;

/// Shard topology of the running node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardCoordinator {
    number_of_shards: u32,
    self_id: ShardId,
    mask_high: u32,
    mask_low: u32,
}

impl ShardCoordinator {
    /// Creates a coordinator for `number_of_shards` shards, running as
    /// `self_id` (which may be `METACHAIN_SHARD_ID`).
    pub fn new(number_of_shards: u32, self_id: ShardId) -> Result<Self, ShardError> {
        if number_of_shards == 0 {
            return Err(ShardError::InvalidNumberOfShards);
        }
        if self_id >= number_of_shards && self_id != METACHAIN_SHARD_ID {
            return Err(ShardError::InvalidShardId {
                self_id,
                number_of_shards,
            });
        }

        let (mask_high, mask_low) = Self::masks(number_of_shards);
        Ok(Self {
            number_of_shards,
            self_id,
            mask_high,
            mask_low,
        })
    }

    /// `n = ceil(log2(shards))`; high mask keeps `n` bits, low mask `n - 1`.
    fn masks(number_of_shards: u32) -> (u32, u32) {
        if number_of_shards <= 1 {
            return (0, 0);
        }
        let n = u32::BITS - (number_of_shards - 1).leading_zeros();
        ((1u32 << n) - 1, (1u32 << (n - 1)) - 1)
    }

    pub fn number_of_shards(&self) -> u32 {
        self.number_of_shards
    }

    pub fn self_id(&self) -> ShardId {
        self.self_id
    }

    pub fn is_metachain(&self) -> bool {
        self.self_id == METACHAIN_SHARD_ID
    }

    /// Computes the shard owning `address` from its trailing bytes.
    pub fn compute_id(&self, address: &[u8]) -> ShardId {
        let bytes_needed = match self.number_of_shards {
            0..=256 => 1,
            257..=65_536 => 2,
            65_537..=16_777_216 => 3,
            _ => 4,
        };
        let start = address.len().saturating_sub(bytes_needed);
        let value = address[start..]
            .iter()
            .fold(0u32, |acc, b| (acc << 8) | u32::from(*b));

        let shard = value & self.mask_high;
        if shard >= self.number_of_shards {
            value & self.mask_low
        } else {
            shard
        }
    }

    /// Returns true if both addresses belong to the same shard.
    pub fn same_shard(&self, first: &[u8], second: &[u8]) -> bool {
        self.compute_id(first) == self.compute_id(second)
    }

    /// Identifier of the channel between this shard and `destination`.
    pub fn communication_identifier(&self, destination: ShardId) -> String {
        communication_identifier_between(self.self_id, destination)
    }
}

/// Identifier of the channel between two shards.
///
/// Equal ids yield `_<id>`; otherwise `_<min>_<max>`. The meta-chain renders
/// as `META` and, being the largest id, always sorts last.
pub fn communication_identifier_between(a: ShardId, b: ShardId) -> String {
    if a == b {
        return format!("_{}", shard_label(a));
    }
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    format!("_{}_{}", shard_label(low), shard_label(high))
}

fn shard_label(id: ShardId) -> String {
    if id == METACHAIN_SHARD_ID {
        "META".to_string()
    } else {
        id.to_string()
    }
}
