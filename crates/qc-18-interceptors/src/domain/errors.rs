//! Interception error types.
//!
//! One enum per stage: container construction (`FactoryError`), decoding and
//! validation of intercepted data (`DataError`), pool acceptance
//! (`ProcessorError`) and the pipeline outcome (`InterceptorError`).

use shared_types::{CodecError, ContainerError, FeeError, Hash, ShardId};
use std::fmt;
use thiserror::Error;

/// Every injectable dependency of the interception subsystem.
///
/// Construction reports the first missing one by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    ShardCoordinator,
    NodesCoordinator,
    Messenger,
    Store,
    Marshalizer,
    TxSignMarshalizer,
    Hasher,
    TxSignHasher,
    MultiSigVerifier,
    DataPool,
    AccountsAdapter,
    AddressPubkeyConverter,
    TxKeyGenerator,
    TxSingleSigner,
    BlockKeyGenerator,
    BlockSingleSigner,
    FeeHandler,
    HeaderSigVerifier,
    HeaderValidator,
    ValidityAttester,
    EpochStartTrigger,
    WhiteListHandler,
    AntifloodHandler,
    BlacklistHandler,
    Throttler,
    DataFactory,
    InterceptorProcessor,
    TxValidator,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Errors raised while building factories, interceptors and containers.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Missing dependency: {0}")]
    MissingDependency(Dependency),

    #[error("Empty chain id")]
    EmptyChainId,

    #[error("Invalid min transaction version: must be greater than zero")]
    InvalidMinTxVersion,

    #[error("Empty topic")]
    EmptyTopic,

    #[error("Invalid max concurrent pipelines: must be greater than zero")]
    InvalidThrottlerCapacity,

    #[error("Shard coordinator does not match the container variant")]
    InvalidShardCoordinator,

    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Messenger error: {0}")]
    Messenger(#[from] MessengerError),
}

/// Errors reported by the transport when wiring topics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessengerError {
    #[error("Topic already has a message processor: {0}")]
    ProcessorAlreadyRegistered(String),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Signature and key errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Not enough signatures: {signed} of {required} required")]
    NotEnoughSignatures { signed: usize, required: usize },

    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    #[error("Empty consensus group")]
    EmptyConsensusGroup,

    #[error("Cannot build signed payload: {0}")]
    Payload(String),
}

/// Decode and validation failures of intercepted data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error("Decode failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Empty batch")]
    EmptyBatch,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid chain id")]
    InvalidChainId,

    #[error("Invalid transaction version {version} (min {min})")]
    InvalidTxVersion { version: u32, min: u32 },

    #[error("Transaction options set on min version")]
    InvalidTxOptions,

    #[error("Signed-with-hash transactions are not enabled yet")]
    SignedWithHashNotEnabled,

    #[error("Invalid shard id: {0}")]
    InvalidShardId(ShardId),

    #[error("Fee check failed: {0}")]
    Fee(#[from] FeeError),

    #[error("Crypto check failed: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Header rejected: {0}")]
    HeaderRejected(String),
}

impl DataError {
    /// True when the failure proves the sending peer produced or relayed
    /// invalid data.
    ///
    /// Feature-gated rejections and temporal header checks are not the
    /// peer's fault: honest nodes may be ahead of or behind this node.
    pub fn is_blacklistable(&self) -> bool {
        !matches!(
            self,
            DataError::SignedWithHashNotEnabled | DataError::HeaderRejected(_)
        )
    }
}

/// Errors raised when validating or saving into pools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    #[error("Wrong data type for processor: {0}")]
    WrongDataType(&'static str),

    #[error("Header is blacklisted: {}", hex::encode(&.0[..4]))]
    BlacklistedHeader(Hash),

    #[error("Header validation failed: {0}")]
    InvalidHeader(String),

    #[error("Sender account not found")]
    AccountNotFound,

    #[error("Nonce too low: account {account}, tx {tx}")]
    NonceTooLow { account: u64, tx: u64 },

    #[error("Nonce too high: account {account}, tx {tx}, max delta {max_delta}")]
    NonceTooHigh { account: u64, tx: u64, max_delta: u64 },
}

/// Outcome of one message through an interceptor pipeline.
///
/// All variants are absorbed at the transport boundary; they exist for
/// logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptorError {
    #[error("Sender or topic is blacklisted")]
    Blacklisted,

    #[error("Message rejected by antiflood")]
    FloodRejected,

    #[error("System is busy: too many messages in flight")]
    SystemBusy,

    #[error("Empty message")]
    EmptyMessage,

    #[error("Topic mismatch: interceptor for {expected}, message on {received}")]
    TopicMismatch { expected: String, received: String },

    #[error("Invalid data: {0}")]
    Data(#[from] DataError),

    #[error("Processor rejected data: {0}")]
    Processor(#[from] ProcessorError),
}
