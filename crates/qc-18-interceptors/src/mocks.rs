//! # Test Doubles
//!
//! Stubs for the outbound ports and builders for fully populated argument
//! bundles. Enabled for unit tests and with the `test-utils` feature.

use crate::adapters::{CacheWhiteList, Ed25519KeyPair, Ed25519Signer, EpochNotifier};
use crate::admission::{Throttler, TimeCacheBlacklist};
use crate::config::{InterceptorsConfig, ThrottlePolicy};
use crate::container::InterceptorsContainerFactoryArgs;
use crate::domain::{
    tx_signing_payload, CryptoError, DataError, InterceptedData, InterceptedMiniBlock,
    InterceptedTransaction, InterceptorError, MessengerError, ProcessorError, TxValidationContext,
    TxVersionChecker, ValidatedData,
};
use crate::factory::{
    ArgInterceptedDataFactory, HeaderKind, InterceptedDataFactory, InterceptedHeaderFactory,
};
use crate::interceptor::ArgInterceptor;
use crate::ports::{
    AntifloodHandler, HeaderSigVerifier, KeyGenerator, MessageProcessor, Messenger,
    MultiSigVerifier, NodesCoordinator, P2pMessage, SingleSigner, ValidityAttester,
};
use crate::processor::{InterceptorProcessor, NilHeaderValidator};
use parking_lot::RwLock;
use shared_types::{
    BlockType, ChainStorer, CodecError, EconomicsConfig, EconomicsData, Hash, HexPubkeyConverter,
    Hasher, Header, InMemoryAccounts, Keccak256Hasher, Marshalizer, MiniBlock, PeerId,
    PoolsHolder, Sha256Hasher, ShardCoordinator, ShardHeader, ShardId, Transaction, U256,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const TEST_CHAIN_ID: &[u8] = b"test-chain";
pub const TEST_MIN_TX_VERSION: u32 = 1;

// =============================================================================
// TRANSPORT
// =============================================================================

/// In-memory messenger recording topic registrations.
#[derive(Default)]
pub struct MockMessenger {
    topics: RwLock<BTreeSet<String>>,
    processors: RwLock<HashMap<String, Arc<dyn MessageProcessor>>>,
    fail_on: RwLock<Option<String>>,
}

impl MockMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes registration on `topic` fail with a transport error.
    pub fn fail_registration_on(&self, topic: &str) {
        *self.fail_on.write() = Some(topic.to_string());
    }

    /// Topics that currently have a processor.
    pub fn registered_topics(&self) -> BTreeSet<String> {
        self.processors.read().keys().cloned().collect()
    }

    pub fn processor(&self, topic: &str) -> Option<Arc<dyn MessageProcessor>> {
        self.processors.read().get(topic).cloned()
    }

    /// Hands `message` to the processor of its topic, as the transport would.
    pub fn deliver(&self, message: &P2pMessage) -> Option<Result<(), InterceptorError>> {
        let processor = self.processor(&message.topic)?;
        Some(processor.process_received_message(message))
    }
}

impl Messenger for MockMessenger {
    fn has_topic(&self, topic: &str) -> bool {
        self.topics.read().contains(topic)
    }

    fn create_topic(&self, topic: &str, _create_channel_for_topic: bool) -> Result<(), MessengerError> {
        self.topics.write().insert(topic.to_string());
        Ok(())
    }

    fn register_message_processor(
        &self,
        topic: &str,
        processor: Arc<dyn MessageProcessor>,
    ) -> Result<(), MessengerError> {
        if self.fail_on.read().as_deref() == Some(topic) {
            return Err(MessengerError::Transport(format!("refused {topic}")));
        }
        let mut processors = self.processors.write();
        if processors.contains_key(topic) {
            return Err(MessengerError::ProcessorAlreadyRegistered(topic.to_string()));
        }
        processors.insert(topic.to_string(), processor);
        Ok(())
    }

    fn unregister_message_processor(&self, topic: &str) -> Result<(), MessengerError> {
        self.processors
            .write()
            .remove(topic)
            .map(|_| ())
            .ok_or_else(|| MessengerError::TopicNotFound(topic.to_string()))
    }
}

/// Accepts every message and does nothing.
pub struct NoopMessageProcessor;

impl MessageProcessor for NoopMessageProcessor {
    fn process_received_message(&self, _message: &P2pMessage) -> Result<(), InterceptorError> {
        Ok(())
    }
}

// =============================================================================
// CONSENSUS AND CRYPTO
// =============================================================================

/// Returns the same consensus group for every round.
pub struct MockNodesCoordinator {
    group: Vec<Vec<u8>>,
}

impl MockNodesCoordinator {
    pub fn new(group: Vec<Vec<u8>>) -> Self {
        Self { group }
    }
}

impl NodesCoordinator for MockNodesCoordinator {
    fn compute_consensus_group(
        &self,
        _randomness: &[u8],
        _round: u64,
        _shard_id: ShardId,
        _epoch: u32,
    ) -> Result<Vec<Vec<u8>>, CryptoError> {
        Ok(self.group.clone())
    }
}

/// Accepts any key and any signature.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAllSigner;

impl KeyGenerator for AcceptAllSigner {
    fn check_public_key(&self, _public_key: &[u8]) -> Result<(), CryptoError> {
        Ok(())
    }
}

impl SingleSigner for AcceptAllSigner {
    fn verify(&self, _pk: &[u8], _message: &[u8], _signature: &[u8]) -> Result<(), CryptoError> {
        Ok(())
    }
}

impl MultiSigVerifier for AcceptAllSigner {
    fn verify_aggregated(
        &self,
        _public_keys: &[Vec<u8>],
        _message: &[u8],
        _aggregated: &[u8],
    ) -> Result<(), CryptoError> {
        Ok(())
    }
}

/// Header signature verifier that fails every check when `reject` is set.
#[derive(Debug, Default)]
pub struct MockHeaderSigVerifier {
    pub reject: bool,
}

impl MockHeaderSigVerifier {
    fn check(&self) -> Result<(), CryptoError> {
        if self.reject {
            return Err(CryptoError::InvalidSignature);
        }
        Ok(())
    }
}

impl HeaderSigVerifier for MockHeaderSigVerifier {
    fn verify_randomness(&self, _header: &Header) -> Result<(), CryptoError> {
        self.check()
    }

    fn verify_leader_signature(&self, _header: &Header) -> Result<(), CryptoError> {
        self.check()
    }

    fn verify_signature(&self, _header: &Header) -> Result<(), CryptoError> {
        self.check()
    }
}

/// Validity attester rejecting headers older than `min_round`.
#[derive(Debug, Default)]
pub struct MockValidityAttester {
    pub min_round: u64,
}

impl ValidityAttester for MockValidityAttester {
    fn check_block_against_rounder(&self, header: &Header) -> Result<(), DataError> {
        if header.round() < self.min_round {
            return Err(DataError::HeaderRejected(format!(
                "round {} is older than {}",
                header.round(),
                self.min_round
            )));
        }
        Ok(())
    }

    fn check_block_against_final(&self, _header: &Header) -> Result<(), DataError> {
        Ok(())
    }
}

// =============================================================================
// ADMISSION
// =============================================================================

pub struct AcceptAllAntiflood;

impl AntifloodHandler for AcceptAllAntiflood {
    fn can_process_message(&self, _peer: &PeerId, _topic: &str, _size: usize) -> bool {
        true
    }
}

pub struct RejectAllAntiflood;

impl AntifloodHandler for RejectAllAntiflood {
    fn can_process_message(&self, _peer: &PeerId, _topic: &str, _size: usize) -> bool {
        false
    }
}

// =============================================================================
// PIPELINE STAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FactoryMode {
    Valid,
    Failing,
    OtherShard,
}

/// Data factory counting its calls and the peak number of concurrent calls.
///
/// Produces mini-blocks hashed from the raw bytes.
pub struct CountingDataFactory {
    mode: FactoryMode,
    delay: Option<Duration>,
    fail_on: Option<Vec<u8>>,
    shard_coordinator: Arc<ShardCoordinator>,
    calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl CountingDataFactory {
    fn with_mode(mode: FactoryMode) -> Self {
        Self {
            mode,
            delay: None,
            fail_on: None,
            shard_coordinator: Arc::new(two_shards(0)),
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Valid data for shard 0.
    pub fn valid() -> Self {
        Self::with_mode(FactoryMode::Valid)
    }

    /// Every decode fails.
    pub fn failing() -> Self {
        Self::with_mode(FactoryMode::Failing)
    }

    /// Valid data for shard 1, irrelevant to shard 0.
    pub fn other_shard() -> Self {
        Self::with_mode(FactoryMode::OtherShard)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fails decoding of exactly `raw`.
    pub fn failing_on(mut self, raw: Vec<u8>) -> Self {
        self.fail_on = Some(raw);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

impl InterceptedDataFactory for CountingDataFactory {
    fn create(&self, raw: &[u8]) -> Result<InterceptedData, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.mode == FactoryMode::Failing || self.fail_on.as_deref() == Some(raw) {
            return Err(DataError::Codec(CodecError::Decode("mock failure".into())));
        }
        let shard = if self.mode == FactoryMode::OtherShard { 1 } else { 0 };
        let hash = Sha256Hasher.compute(raw);
        Ok(InterceptedData::MiniBlock(InterceptedMiniBlock::new(
            MiniBlock {
                tx_hashes: vec![hash],
                receiver_shard_id: shard,
                sender_shard_id: shard,
                block_type: BlockType::TxBlock,
            },
            raw.to_vec(),
            hash,
            Arc::clone(&self.shard_coordinator),
        )))
    }
}

/// Processor counting validations and saves.
#[derive(Default)]
pub struct CountingProcessor {
    validated: AtomicUsize,
    saved: AtomicUsize,
    refused: Option<Hash>,
}

impl CountingProcessor {
    /// Refuses the object with `hash` as if its sender were unknown.
    pub fn refusing(hash: Hash) -> Self {
        Self {
            refused: Some(hash),
            ..Self::default()
        }
    }

    pub fn validated(&self) -> usize {
        self.validated.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }
}

impl InterceptorProcessor for CountingProcessor {
    fn validate(&self, data: &ValidatedData) -> Result<(), ProcessorError> {
        self.validated.fetch_add(1, Ordering::SeqCst);
        if self.refused.as_ref() == Some(data.hash()) {
            return Err(ProcessorError::AccountNotFound);
        }
        Ok(())
    }

    fn save(&self, _data: &ValidatedData, _from: &PeerId) -> Result<(), ProcessorError> {
        self.saved.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

fn two_shards(self_id: ShardId) -> ShardCoordinator {
    ShardCoordinator::new(2, self_id).expect("valid test shard coordinator")
}

/// Deterministic Ed25519 key pair.
pub fn test_keypair(seed: u8) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed([seed; 32])
}

/// Data factory arguments with real Ed25519 transaction signatures and
/// accept-all header checks.
pub fn test_data_factory_args(shards: u32, self_id: ShardId) -> ArgInterceptedDataFactory {
    ArgInterceptedDataFactory {
        shard_coordinator: Arc::new(
            ShardCoordinator::new(shards, self_id).expect("valid test shard coordinator"),
        ),
        marshalizer: Marshalizer::bincode(),
        tx_sign_marshalizer: Marshalizer::json(),
        hasher: Arc::new(Sha256Hasher),
        tx_sign_hasher: Arc::new(Keccak256Hasher),
        header_sig_verifier: Arc::new(MockHeaderSigVerifier::default()),
        validity_attester: Arc::new(MockValidityAttester::default()),
        tx_key_gen: Arc::new(Ed25519Signer),
        tx_single_signer: Arc::new(Ed25519Signer),
        block_key_gen: Arc::new(Ed25519Signer),
        fee_handler: Arc::new(EconomicsData::new(EconomicsConfig::default())),
        whitelist: Arc::new(CacheWhiteList::default()),
        address_pubkey_converter: Arc::new(HexPubkeyConverter::default()),
        epoch_start_trigger: Arc::new(EpochNotifier::default()),
        chain_id: TEST_CHAIN_ID.to_vec(),
        min_tx_version: TEST_MIN_TX_VERSION,
        enable_signed_tx_with_hash_epoch: 0,
    }
}

/// A transaction from `keypair`, signed the way `args` verifies it.
pub fn signed_transaction(
    args: &ArgInterceptedDataFactory,
    keypair: &Ed25519KeyPair,
    nonce: u64,
    version: u32,
    options: u32,
) -> Transaction {
    let economics = EconomicsConfig::default();
    let mut tx = Transaction {
        nonce,
        value: U256::from(1_000u64),
        receiver: [2u8; 32],
        sender: keypair.public_key(),
        gas_price: economics.min_gas_price,
        gas_limit: economics.min_gas_limit,
        data: vec![],
        chain_id: args.chain_id.clone(),
        version,
        options,
        signature: vec![],
    };
    let payload = tx_signing_payload(
        &tx,
        &args.tx_sign_marshalizer,
        args.tx_sign_hasher.as_ref(),
        &TxVersionChecker::new(args.min_tx_version),
    )
    .expect("signing payload");
    tx.signature = keypair.sign(&payload);
    tx
}

/// A shard header passing every structural check.
pub fn valid_shard_header(shard_id: ShardId, chain_id: &[u8]) -> ShardHeader {
    ShardHeader {
        nonce: 1,
        round: 1,
        shard_id,
        prev_rand_seed: vec![1u8; 32],
        rand_seed: vec![2u8; 32],
        pub_keys_bitmap: vec![0xff],
        chain_id: chain_id.to_vec(),
        signature: vec![3u8; 64],
        leader_signature: vec![4u8; 64],
        ..Default::default()
    }
}

/// Validated shard header of `shard_id`, as seen by shard 0 of 2.
pub fn validated_header(shard_id: ShardId) -> ValidatedData {
    let args = test_data_factory_args(2, 0);
    let factory =
        InterceptedHeaderFactory::new(&args, HeaderKind::Shard).expect("header factory");
    let raw = args
        .marshalizer
        .marshal(&valid_shard_header(shard_id, TEST_CHAIN_ID))
        .expect("marshal header");
    factory
        .create(&raw)
        .and_then(InterceptedData::validate)
        .expect("valid header")
}

/// Validated transaction between two shards of a 2-shard network, as seen
/// by shard 0. Keys and signatures are not checked.
pub fn validated_transaction(sender_shard: ShardId, receiver_shard: ShardId) -> ValidatedData {
    let economics = EconomicsConfig::default();
    let address = |shard: ShardId| {
        let mut address = [9u8; 32];
        address[31] = shard as u8;
        address
    };
    let tx = Transaction {
        nonce: 0,
        value: U256::from(1u64),
        receiver: address(receiver_shard),
        sender: address(sender_shard),
        gas_price: economics.min_gas_price,
        gas_limit: economics.min_gas_limit,
        data: vec![],
        chain_id: TEST_CHAIN_ID.to_vec(),
        version: TEST_MIN_TX_VERSION,
        options: 0,
        signature: vec![1u8; 64],
    };
    let marshalizer = Marshalizer::bincode();
    let raw = marshalizer.marshal(&tx).expect("marshal tx");
    let hash = Sha256Hasher.compute(&raw);
    let ctx = Arc::new(TxValidationContext {
        shard_coordinator: Arc::new(two_shards(0)),
        key_gen: Arc::new(AcceptAllSigner),
        signer: Arc::new(AcceptAllSigner),
        fee_handler: Arc::new(EconomicsData::default()),
        whitelist: Arc::new(CacheWhiteList::default()),
        sign_marshalizer: Marshalizer::json(),
        sign_hasher: Arc::new(Keccak256Hasher),
        chain_id: TEST_CHAIN_ID.to_vec(),
        version_checker: TxVersionChecker::new(TEST_MIN_TX_VERSION),
    });
    InterceptedData::Transaction(InterceptedTransaction::new(tx, raw, hash, ctx))
        .validate()
        .expect("valid transaction")
}

/// Interceptor arguments with permissive admission and a counting processor.
pub fn test_interceptor_args(topic: &str, factory: Arc<dyn InterceptedDataFactory>) -> ArgInterceptor {
    ArgInterceptor {
        topic: topic.to_string(),
        factory,
        processor: Arc::new(CountingProcessor::default()),
        throttler: Arc::new(
            Throttler::new(10, ThrottlePolicy::FailFast).expect("non-zero capacity"),
        ),
        antiflood: Arc::new(AcceptAllAntiflood),
        blacklist: Arc::new(TimeCacheBlacklist::default()),
        whitelist: Arc::new(CacheWhiteList::default()),
        peer_ban_duration: Duration::from_secs(60),
    }
}

/// Fully populated container factory arguments and the messenger they use.
pub fn test_container_args(
    shards: u32,
    self_id: ShardId,
) -> (InterceptorsContainerFactoryArgs, Arc<MockMessenger>) {
    let messenger = Arc::new(MockMessenger::new());
    let args = InterceptorsContainerFactoryArgs {
        shard_coordinator: Some(Arc::new(
            ShardCoordinator::new(shards, self_id).expect("valid test shard coordinator"),
        )),
        nodes_coordinator: Some(Arc::new(MockNodesCoordinator::new(vec![vec![1u8; 32]]))),
        messenger: Some(messenger.clone()),
        store: Some(Arc::new(ChainStorer::in_memory())),
        marshalizer: Some(Marshalizer::bincode()),
        tx_sign_marshalizer: Some(Marshalizer::json()),
        hasher: Some(Arc::new(Sha256Hasher)),
        tx_sign_hasher: Some(Arc::new(Keccak256Hasher)),
        multi_sig_verifier: Some(Arc::new(Ed25519Signer)),
        data_pool: Some(PoolsHolder::default()),
        accounts: Some(Arc::new(InMemoryAccounts::new())),
        address_pubkey_converter: Some(Arc::new(HexPubkeyConverter::default())),
        tx_key_gen: Some(Arc::new(Ed25519Signer)),
        tx_single_signer: Some(Arc::new(Ed25519Signer)),
        block_key_gen: Some(Arc::new(Ed25519Signer)),
        block_single_signer: Some(Arc::new(Ed25519Signer)),
        fee_handler: Some(Arc::new(EconomicsData::default())),
        header_sig_verifier: Some(Arc::new(MockHeaderSigVerifier::default())),
        header_validator: Some(Arc::new(NilHeaderValidator)),
        validity_attester: Some(Arc::new(MockValidityAttester::default())),
        epoch_start_trigger: Some(Arc::new(EpochNotifier::default())),
        whitelist: Some(Arc::new(CacheWhiteList::default())),
        antiflood: Some(Arc::new(AcceptAllAntiflood)),
        blacklist: Some(Arc::new(TimeCacheBlacklist::default())),
        chain_id: TEST_CHAIN_ID.to_vec(),
        min_tx_version: TEST_MIN_TX_VERSION,
        config: InterceptorsConfig::default(),
    };
    (args, messenger)
}
