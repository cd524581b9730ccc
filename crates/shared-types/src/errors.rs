//! # Error Types
//!
//! Defines error types used across subsystems.

use crate::entities::ShardId;
use thiserror::Error;

/// Errors raised by marshalizers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input buffer was empty.
    #[error("Empty input")]
    EmptyInput,

    /// Input exceeds the configured message limit.
    #[error("Input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: u64 },

    /// Bytes did not decode into the requested type.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// Value could not be encoded.
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Input is larger than its canonical re-encoding allows.
    #[error("Size check failed: received {received} bytes, canonical {canonical} (delta {delta})")]
    SizeCheckFailed {
        received: usize,
        canonical: usize,
        delta: u32,
    },
}

/// Errors that can occur in the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Key not found in storage.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// No storer registered for the requested unit.
    #[error("Storage unit not found: {0}")]
    UnitNotFound(String),

    /// Backend operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Errors raised by keyed containers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// The key is already present; the existing value is kept.
    #[error("Item already exists: {key}")]
    ItemAlreadyExists { key: String },

    /// The key is not present.
    #[error("Invalid container key: {key}")]
    InvalidKey { key: String },

    /// Keys and values passed to a bulk insert differ in length.
    #[error("Length mismatch: {keys} keys, {values} values")]
    LengthMismatch { keys: usize, values: usize },
}

/// Errors raised when a transaction fails the fee rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    #[error("Gas price {provided} lower than minimum {min}")]
    InsufficientGasPrice { provided: u64, min: u64 },

    #[error("Gas limit {provided} lower than required {required}")]
    InsufficientGasLimit { provided: u64, required: u64 },

    #[error("Gas limit {provided} higher than block limit {max}")]
    HigherGasLimitThanBlock { provided: u64, max: u64 },
}

/// Errors raised by the accounts layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountsError {
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Invalid public key: {0}")]
    InvalidPubkey(String),
}

/// Errors raised when building a shard coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShardError {
    #[error("Number of shards must be greater than zero")]
    InvalidNumberOfShards,

    #[error("Self shard {self_id} out of range for {number_of_shards} shards")]
    InvalidShardId {
        self_id: ShardId,
        number_of_shards: u32,
    },
}
