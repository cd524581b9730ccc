use crate::fixtures::{peer, ShardNode};
use qc_18_interceptors::domain::DataError;
use qc_18_interceptors::ports::{BlacklistHandler, BlacklistIdentity};
use qc_18_interceptors::InterceptorError;
use shared_types::U256;

#[test]
fn test_tampered_value_fails_signature() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let mut tx = node.signed_tx(&sender, 0);
    tx.value = U256::from(1_000_000_000u64);

    let result = node.deliver(&node.tx_topic(1), node.tx_batch(&[tx]), peer(1));
    assert!(matches!(result, Err(InterceptorError::Data(DataError::Crypto(_)))), "{result:?}");
    assert!(node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(1))));
    assert!(node.pools.transactions.is_empty());
}

#[test]
fn test_impersonated_sender_fails_signature() {
    let node = ShardNode::start(2, 0);
    let victim = node.sender_in_shard(1, 0);
    let attacker = node.sender_in_shard(1, 1);
    let mut tx = node.signed_tx(&victim, 0);
    tx.signature = node.signed_tx(&attacker, 0).signature;

    let result = node.deliver(&node.tx_topic(1), node.tx_batch(&[tx]), peer(2));
    assert!(matches!(result, Err(InterceptorError::Data(DataError::Crypto(_)))), "{result:?}");
    assert!(node.pools.transactions.is_empty());
}

#[test]
fn test_other_chain_transaction_rejected() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let mut tx = node.signed_tx(&sender, 0);
    tx.chain_id = b"other-chain".to_vec();
    // Correctly signed for the other chain: a replay across networks.
    let tx = node.sign(tx, &sender);

    assert_eq!(
        node.deliver(&node.tx_topic(1), node.tx_batch(&[tx]), peer(3)),
        Err(InterceptorError::Data(DataError::InvalidChainId))
    );
    assert!(node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(3))));
}

#[test]
fn test_stripped_signature_rejected() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let mut tx = node.signed_tx(&sender, 0);
    tx.signature.clear();

    assert_eq!(
        node.deliver(&node.tx_topic(1), node.tx_batch(&[tx]), peer(4)),
        Err(InterceptorError::Data(DataError::MissingField("signature")))
    );
}

#[test]
fn test_stale_nonce_is_not_a_ban() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(0, 0);
    node.fund(&sender, 10);
    let tx = node.signed_tx(&sender, 9);

    assert!(matches!(
        node.deliver(&node.tx_topic(0), node.tx_batch(&[tx]), peer(5)),
        Err(InterceptorError::Processor(_))
    ));
    // Honest peers relay transactions that became stale in flight.
    assert!(!node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(5))));
}
