//! A shard node assembled from the real container factories.
//!
//! Interceptors and pre-processors share one set of pools and one store, so
//! data accepted from gossip is what block assembly sees.

use qc_18_interceptors::adapters::Ed25519KeyPair;
use qc_18_interceptors::domain::{tx_signing_payload, TxVersionChecker};
use qc_18_interceptors::mocks::{
    signed_transaction, test_container_args, test_data_factory_args, test_keypair, MockMessenger,
    TEST_MIN_TX_VERSION,
};
use qc_18_interceptors::{
    ArgInterceptedDataFactory, InterceptorError, InterceptorsContainer,
    InterceptorsContainerFactoryArgs, P2pMessage, ShardInterceptorsContainerFactory,
    TimeCacheBlacklist, TopicFamily,
};
use qc_19_preprocessors::mocks::{test_preprocessor_args, RecordingRequestHandler};
use qc_19_preprocessors::ArgPreProcessor;
use quantum_telemetry::{init_logging, TelemetryConfig};
use shared_types::{
    calculate_hash, Account, Batch, ChainStorer, Hash, InMemoryAccounts, Marshalizer, PeerId,
    PoolsHolder, Sha256Hasher, ShardCoordinator, ShardId, Transaction, U256,
};
use std::sync::{Arc, Once};

static LOGGING: Once = Once::new();

/// Installs the console subscriber once per test binary, honouring
/// `QC_LOG_LEVEL`/`RUST_LOG`.
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        // Another harness may already own the global subscriber.
        let _ = init_logging(&TelemetryConfig::from_env());
    });
}

pub struct ShardNode {
    pub coordinator: Arc<ShardCoordinator>,
    pub pools: PoolsHolder,
    pub store: Arc<ChainStorer>,
    pub accounts: Arc<InMemoryAccounts>,
    pub blacklist: Arc<TimeCacheBlacklist>,
    pub messenger: Arc<MockMessenger>,
    pub interceptors: InterceptorsContainer,
    signing_args: ArgInterceptedDataFactory,
    marshalizer: Marshalizer,
}

impl ShardNode {
    pub fn start(shards: u32, self_id: ShardId) -> Self {
        Self::start_with(shards, self_id, |_| {})
    }

    /// Starts a node after `customize` adjusted the container arguments.
    pub fn start_with(
        shards: u32,
        self_id: ShardId,
        customize: impl FnOnce(&mut InterceptorsContainerFactoryArgs),
    ) -> Self {
        init_test_logging();

        let (mut args, messenger) = test_container_args(shards, self_id);
        let coordinator =
            Arc::new(ShardCoordinator::new(shards, self_id).expect("valid shard coordinator"));
        let pools = PoolsHolder::default();
        let store = Arc::new(ChainStorer::in_memory());
        let accounts = Arc::new(InMemoryAccounts::new());
        let blacklist = Arc::new(TimeCacheBlacklist::default());

        args.shard_coordinator = Some(coordinator.clone());
        args.data_pool = Some(pools.clone());
        args.store = Some(store.clone());
        args.accounts = Some(accounts.clone());
        args.blacklist = Some(blacklist.clone());
        customize(&mut args);

        let interceptors = ShardInterceptorsContainerFactory::new(args)
            .and_then(|factory| factory.create())
            .expect("interceptors container");

        Self {
            coordinator,
            pools,
            store,
            accounts,
            blacklist,
            messenger,
            interceptors,
            signing_args: test_data_factory_args(shards, self_id),
            marshalizer: Marshalizer::bincode(),
        }
    }

    pub fn self_id(&self) -> ShardId {
        self.coordinator.self_id()
    }

    /// The `nth` deterministic key pair whose address lives in `shard`.
    pub fn sender_in_shard(&self, shard: ShardId, nth: usize) -> Ed25519KeyPair {
        (1..=u8::MAX)
            .map(test_keypair)
            .filter(|keypair| self.coordinator.compute_id(&keypair.public_key()) == shard)
            .nth(nth)
            .expect("enough test keys in shard")
    }

    /// Creates the account of `keypair` at `nonce`.
    pub fn fund(&self, keypair: &Ed25519KeyPair, nonce: u64) {
        self.accounts.set_account(Account {
            address: keypair.public_key(),
            nonce,
            balance: U256::from(1_000_000_000u64),
        });
    }

    /// Transfer from `keypair` to an account of this shard, correctly signed.
    pub fn signed_tx(&self, keypair: &Ed25519KeyPair, nonce: u64) -> Transaction {
        let mut tx = signed_transaction(&self.signing_args, keypair, nonce, TEST_MIN_TX_VERSION, 0);
        tx.receiver[31] = self.self_id() as u8;
        self.sign(tx, keypair)
    }

    /// Signs `tx` again, after a field was changed on purpose.
    pub fn sign(&self, mut tx: Transaction, keypair: &Ed25519KeyPair) -> Transaction {
        let payload = tx_signing_payload(
            &tx,
            &self.signing_args.tx_sign_marshalizer,
            self.signing_args.tx_sign_hasher.as_ref(),
            &TxVersionChecker::new(self.signing_args.min_tx_version),
        )
        .expect("signing payload");
        tx.signature = keypair.sign(&payload);
        tx
    }

    pub fn tx_hash(&self, tx: &Transaction) -> Hash {
        calculate_hash(&self.marshalizer, &Sha256Hasher, tx).expect("hashable transaction")
    }

    /// Gossip payload of a transactions topic.
    pub fn tx_batch(&self, txs: &[Transaction]) -> Vec<u8> {
        let data = txs
            .iter()
            .map(|tx| self.marshalizer.marshal(tx).expect("marshal transaction"))
            .collect();
        self.marshalizer
            .marshal(&Batch { data })
            .expect("marshal batch")
    }

    /// Transactions topic shared with `sender_shard`.
    pub fn tx_topic(&self, sender_shard: ShardId) -> String {
        TopicFamily::Transactions.topic_between(sender_shard, self.self_id())
    }

    /// Hands a message to the interceptor of `topic`, as the transport would.
    pub fn deliver(&self, topic: &str, data: Vec<u8>, peer: PeerId) -> Result<(), InterceptorError> {
        self.messenger
            .deliver(&P2pMessage::new(topic, data, peer))
            .expect("topic has an interceptor")
    }

    /// Pre-processor arguments over this node's pools, store and accounts.
    pub fn preprocessor_args(&self) -> (ArgPreProcessor, Arc<RecordingRequestHandler>) {
        let (mut args, requests) =
            test_preprocessor_args(self.coordinator.number_of_shards(), self.self_id());
        args.shard_coordinator = self.coordinator.clone();
        args.data_pool = self.pools.clone();
        args.store = self.store.clone();
        args.accounts = self.accounts.clone();
        (args, requests)
    }
}

pub fn peer(byte: u8) -> PeerId {
    PeerId::new([byte; 32])
}
