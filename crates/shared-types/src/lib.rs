//! # Shared Types Crate
//!
//! Domain entities and the primitives every subsystem is wired with: shard
//! topology, marshalizers, hashers, keyed containers, data pools, storage
//! units, fee rules and account access.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: wire entities are defined once, here.
//! - **Idempotent Pools**: inserting a known hash is a no-op, never an error.
//! - **Bounded Decoding**: marshalizers cap allocation on untrusted input.

pub mod accounts;
pub mod codec;
pub mod container;
pub mod economics;
pub mod entities;
pub mod errors;
pub mod hashing;
pub mod pool;
pub mod shard;
pub mod storage;

pub use accounts::{Account, AccountsAdapter, HexPubkeyConverter, InMemoryAccounts, PubkeyConverter};
pub use codec::{Marshalizer, MarshalizerKind};
pub use container::KeyedContainer;
pub use economics::{EconomicsConfig, EconomicsData, FeeHandler};
pub use entities::*;
pub use errors::*;
pub use hashing::{calculate_hash, Hasher, Keccak256Hasher, Sha256Hasher};
pub use pool::{Cacher, HeadersPool, PoolHandler, PoolsConfig, PoolsHolder, ShardedDataPool};
pub use shard::{communication_identifier_between, ShardCoordinator};
pub use storage::{ChainStorer, MemoryStorer, Storer, UnitType};
