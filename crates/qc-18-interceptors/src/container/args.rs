//! Container factory arguments.
//!
//! Callers fill an `InterceptorsContainerFactoryArgs` whose references are
//! all optional; `resolve` turns it into a `ResolvedArgs` with every
//! dependency present, or names the first one missing.

use crate::config::InterceptorsConfig;
use crate::domain::{Dependency, FactoryError};
use crate::factory::ArgInterceptedDataFactory;
use crate::ports::{
    AntifloodHandler, BlacklistHandler, EpochStartTrigger, HeaderSigVerifier, HeaderValidator,
    KeyGenerator, Messenger, MultiSigVerifier, NodesCoordinator, SingleSigner, ValidityAttester,
    WhiteListHandler,
};
use shared_types::{
    AccountsAdapter, ChainStorer, FeeHandler, Hasher, Marshalizer, PoolsHolder, PubkeyConverter,
    ShardCoordinator,
};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct InterceptorsContainerFactoryArgs {
    pub shard_coordinator: Option<Arc<ShardCoordinator>>,
    pub nodes_coordinator: Option<Arc<dyn NodesCoordinator>>,
    pub messenger: Option<Arc<dyn Messenger>>,
    pub store: Option<Arc<ChainStorer>>,
    pub marshalizer: Option<Marshalizer>,
    pub tx_sign_marshalizer: Option<Marshalizer>,
    pub hasher: Option<Arc<dyn Hasher>>,
    pub tx_sign_hasher: Option<Arc<dyn Hasher>>,
    pub multi_sig_verifier: Option<Arc<dyn MultiSigVerifier>>,
    pub data_pool: Option<PoolsHolder>,
    pub accounts: Option<Arc<dyn AccountsAdapter>>,
    pub address_pubkey_converter: Option<Arc<dyn PubkeyConverter>>,
    pub tx_key_gen: Option<Arc<dyn KeyGenerator>>,
    pub tx_single_signer: Option<Arc<dyn SingleSigner>>,
    pub block_key_gen: Option<Arc<dyn KeyGenerator>>,
    pub block_single_signer: Option<Arc<dyn SingleSigner>>,
    pub fee_handler: Option<Arc<dyn FeeHandler>>,
    pub header_sig_verifier: Option<Arc<dyn HeaderSigVerifier>>,
    pub header_validator: Option<Arc<dyn HeaderValidator>>,
    pub validity_attester: Option<Arc<dyn ValidityAttester>>,
    pub epoch_start_trigger: Option<Arc<dyn EpochStartTrigger>>,
    pub whitelist: Option<Arc<dyn WhiteListHandler>>,
    pub antiflood: Option<Arc<dyn AntifloodHandler>>,
    pub blacklist: Option<Arc<dyn BlacklistHandler>>,
    pub chain_id: Vec<u8>,
    pub min_tx_version: u32,
    pub config: InterceptorsConfig,
}

/// Arguments with every dependency present.
#[derive(Clone)]
pub struct ResolvedArgs {
    pub shard_coordinator: Arc<ShardCoordinator>,
    pub nodes_coordinator: Arc<dyn NodesCoordinator>,
    pub messenger: Arc<dyn Messenger>,
    pub store: Arc<ChainStorer>,
    pub marshalizer: Marshalizer,
    pub tx_sign_marshalizer: Marshalizer,
    pub hasher: Arc<dyn Hasher>,
    pub tx_sign_hasher: Arc<dyn Hasher>,
    pub multi_sig_verifier: Arc<dyn MultiSigVerifier>,
    pub data_pool: PoolsHolder,
    pub accounts: Arc<dyn AccountsAdapter>,
    pub address_pubkey_converter: Arc<dyn PubkeyConverter>,
    pub tx_key_gen: Arc<dyn KeyGenerator>,
    pub tx_single_signer: Arc<dyn SingleSigner>,
    pub block_key_gen: Arc<dyn KeyGenerator>,
    pub block_single_signer: Arc<dyn SingleSigner>,
    pub fee_handler: Arc<dyn FeeHandler>,
    pub header_sig_verifier: Arc<dyn HeaderSigVerifier>,
    pub header_validator: Arc<dyn HeaderValidator>,
    pub validity_attester: Arc<dyn ValidityAttester>,
    pub epoch_start_trigger: Arc<dyn EpochStartTrigger>,
    pub whitelist: Arc<dyn WhiteListHandler>,
    pub antiflood: Arc<dyn AntifloodHandler>,
    pub blacklist: Arc<dyn BlacklistHandler>,
    pub chain_id: Vec<u8>,
    pub min_tx_version: u32,
    pub config: InterceptorsConfig,
}

fn require<T>(value: Option<T>, dependency: Dependency) -> Result<T, FactoryError> {
    value.ok_or(FactoryError::MissingDependency(dependency))
}

impl InterceptorsContainerFactoryArgs {
    /// Checks every dependency in declaration order.
    pub fn resolve(self) -> Result<ResolvedArgs, FactoryError> {
        let resolved = ResolvedArgs {
            shard_coordinator: require(self.shard_coordinator, Dependency::ShardCoordinator)?,
            nodes_coordinator: require(self.nodes_coordinator, Dependency::NodesCoordinator)?,
            messenger: require(self.messenger, Dependency::Messenger)?,
            store: require(self.store, Dependency::Store)?,
            marshalizer: require(self.marshalizer, Dependency::Marshalizer)?,
            tx_sign_marshalizer: require(self.tx_sign_marshalizer, Dependency::TxSignMarshalizer)?,
            hasher: require(self.hasher, Dependency::Hasher)?,
            tx_sign_hasher: require(self.tx_sign_hasher, Dependency::TxSignHasher)?,
            multi_sig_verifier: require(self.multi_sig_verifier, Dependency::MultiSigVerifier)?,
            data_pool: require(self.data_pool, Dependency::DataPool)?,
            accounts: require(self.accounts, Dependency::AccountsAdapter)?,
            address_pubkey_converter: require(
                self.address_pubkey_converter,
                Dependency::AddressPubkeyConverter,
            )?,
            tx_key_gen: require(self.tx_key_gen, Dependency::TxKeyGenerator)?,
            tx_single_signer: require(self.tx_single_signer, Dependency::TxSingleSigner)?,
            block_key_gen: require(self.block_key_gen, Dependency::BlockKeyGenerator)?,
            block_single_signer: require(self.block_single_signer, Dependency::BlockSingleSigner)?,
            fee_handler: require(self.fee_handler, Dependency::FeeHandler)?,
            header_sig_verifier: require(self.header_sig_verifier, Dependency::HeaderSigVerifier)?,
            header_validator: require(self.header_validator, Dependency::HeaderValidator)?,
            validity_attester: require(self.validity_attester, Dependency::ValidityAttester)?,
            epoch_start_trigger: require(self.epoch_start_trigger, Dependency::EpochStartTrigger)?,
            whitelist: require(self.whitelist, Dependency::WhiteListHandler)?,
            antiflood: require(self.antiflood, Dependency::AntifloodHandler)?,
            blacklist: require(self.blacklist, Dependency::BlacklistHandler)?,
            chain_id: self.chain_id,
            min_tx_version: self.min_tx_version,
            config: self.config,
        };

        if resolved.chain_id.is_empty() {
            return Err(FactoryError::EmptyChainId);
        }
        if resolved.min_tx_version == 0 {
            return Err(FactoryError::InvalidMinTxVersion);
        }
        Ok(resolved)
    }
}

impl ResolvedArgs {
    pub fn data_factory_args(&self) -> ArgInterceptedDataFactory {
        ArgInterceptedDataFactory {
            shard_coordinator: Arc::clone(&self.shard_coordinator),
            marshalizer: self.marshalizer.clone(),
            tx_sign_marshalizer: self.tx_sign_marshalizer.clone(),
            hasher: Arc::clone(&self.hasher),
            tx_sign_hasher: Arc::clone(&self.tx_sign_hasher),
            header_sig_verifier: Arc::clone(&self.header_sig_verifier),
            validity_attester: Arc::clone(&self.validity_attester),
            tx_key_gen: Arc::clone(&self.tx_key_gen),
            tx_single_signer: Arc::clone(&self.tx_single_signer),
            block_key_gen: Arc::clone(&self.block_key_gen),
            fee_handler: Arc::clone(&self.fee_handler),
            whitelist: Arc::clone(&self.whitelist),
            address_pubkey_converter: Arc::clone(&self.address_pubkey_converter),
            epoch_start_trigger: Arc::clone(&self.epoch_start_trigger),
            chain_id: self.chain_id.clone(),
            min_tx_version: self.min_tx_version,
            enable_signed_tx_with_hash_epoch: self.config.enable_signed_tx_with_hash_epoch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::test_container_args;

    macro_rules! assert_missing {
        ($field:ident, $dependency:expr) => {{
            let (mut args, _) = test_container_args(2, 0);
            args.$field = None;
            match args.resolve() {
                Err(FactoryError::MissingDependency(d)) => assert_eq!(d, $dependency),
                Err(other) => panic!("unexpected error {other}"),
                Ok(_) => panic!("resolved without {}", stringify!($field)),
            }
        }};
    }

    #[test]
    fn test_each_missing_dependency_is_named() {
        assert_missing!(shard_coordinator, Dependency::ShardCoordinator);
        assert_missing!(nodes_coordinator, Dependency::NodesCoordinator);
        assert_missing!(messenger, Dependency::Messenger);
        assert_missing!(store, Dependency::Store);
        assert_missing!(marshalizer, Dependency::Marshalizer);
        assert_missing!(tx_sign_marshalizer, Dependency::TxSignMarshalizer);
        assert_missing!(hasher, Dependency::Hasher);
        assert_missing!(tx_sign_hasher, Dependency::TxSignHasher);
        assert_missing!(multi_sig_verifier, Dependency::MultiSigVerifier);
        assert_missing!(data_pool, Dependency::DataPool);
        assert_missing!(accounts, Dependency::AccountsAdapter);
        assert_missing!(address_pubkey_converter, Dependency::AddressPubkeyConverter);
        assert_missing!(tx_key_gen, Dependency::TxKeyGenerator);
        assert_missing!(tx_single_signer, Dependency::TxSingleSigner);
        assert_missing!(block_key_gen, Dependency::BlockKeyGenerator);
        assert_missing!(block_single_signer, Dependency::BlockSingleSigner);
        assert_missing!(fee_handler, Dependency::FeeHandler);
        assert_missing!(header_sig_verifier, Dependency::HeaderSigVerifier);
        assert_missing!(header_validator, Dependency::HeaderValidator);
        assert_missing!(validity_attester, Dependency::ValidityAttester);
        assert_missing!(epoch_start_trigger, Dependency::EpochStartTrigger);
        assert_missing!(whitelist, Dependency::WhiteListHandler);
        assert_missing!(antiflood, Dependency::AntifloodHandler);
        assert_missing!(blacklist, Dependency::BlacklistHandler);
    }

    #[test]
    fn test_empty_chain_id_rejected() {
        let (mut args, _) = test_container_args(2, 0);
        args.chain_id.clear();
        assert!(matches!(args.resolve(), Err(FactoryError::EmptyChainId)));
    }

    #[test]
    fn test_zero_min_tx_version_rejected() {
        let (mut args, _) = test_container_args(2, 0);
        args.min_tx_version = 0;
        assert!(matches!(
            args.resolve(),
            Err(FactoryError::InvalidMinTxVersion)
        ));
    }
}
