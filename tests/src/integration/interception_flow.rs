//! Gossip to pools: what a shard node keeps from its topics.

use crate::fixtures::{peer, ShardNode};
use qc_18_interceptors::mocks::{valid_shard_header, TEST_CHAIN_ID};
use qc_18_interceptors::ports::{BlacklistHandler, BlacklistIdentity};
use qc_18_interceptors::{InterceptorError, P2pMessage, ProcessorError, TopicFamily};
use shared_types::{communication_identifier_between, Marshalizer, METACHAIN_SHARD_ID};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_node_registers_every_topic_it_intercepts() {
    let node = ShardNode::start(2, 0);
    let registered = node.messenger.registered_topics();

    assert_eq!(registered.len(), node.interceptors.len());
    for topic in node.interceptors.topics() {
        assert!(registered.contains(topic), "{topic} not registered");
    }
    assert!(registered.contains(&node.tx_topic(1)));
    assert!(registered.contains(&TopicFamily::ShardBlocks.topic_between(0, METACHAIN_SHARD_ID)));
}

#[test]
fn test_signed_cross_shard_transaction_is_pooled() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let tx = node.signed_tx(&sender, 0);
    let hash = node.tx_hash(&tx);

    node.deliver(&node.tx_topic(1), node.tx_batch(&[tx.clone()]), peer(1))
        .unwrap();

    assert_eq!(node.pools.transactions.search_first_data(&hash), Some(tx));
    let partition = node
        .pools
        .transactions
        .shard_data_store(&communication_identifier_between(1, 0))
        .unwrap();
    assert!(partition.has(&hash));
}

#[test]
fn test_intra_shard_transaction_needs_known_sender() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(0, 0);
    let tx = node.signed_tx(&sender, 0);

    assert_eq!(
        node.deliver(&node.tx_topic(0), node.tx_batch(&[tx.clone()]), peer(1)),
        Err(InterceptorError::Processor(ProcessorError::AccountNotFound))
    );
    assert!(node.pools.transactions.is_empty());

    // Same peer, now that the account exists: not blacklisted by the miss.
    node.fund(&sender, 0);
    node.deliver(&node.tx_topic(0), node.tx_batch(&[tx]), peer(1))
        .unwrap();
    assert_eq!(node.pools.transactions.len(), 1);
}

#[test]
fn test_batch_keeps_every_valid_transaction() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(0, 0);
    node.fund(&sender, 3);
    let txs: Vec<_> = (3..6).map(|nonce| node.signed_tx(&sender, nonce)).collect();

    node.deliver(&node.tx_topic(0), node.tx_batch(&txs), peer(2))
        .unwrap();

    for tx in &txs {
        assert!(node.pools.transactions.search_first_data(&node.tx_hash(tx)).is_some());
    }
}

#[test]
fn test_unknown_sender_does_not_drop_batch_siblings() {
    let node = ShardNode::start(2, 0);
    let funded = node.sender_in_shard(0, 0);
    node.fund(&funded, 3);
    let unknown = node.sender_in_shard(0, 1);
    let mut txs: Vec<_> = (3..6).map(|nonce| node.signed_tx(&funded, nonce)).collect();
    let orphan = node.signed_tx(&unknown, 0);
    txs.insert(1, orphan.clone());

    assert_eq!(
        node.deliver(&node.tx_topic(0), node.tx_batch(&txs), peer(2)),
        Err(InterceptorError::Processor(ProcessorError::AccountNotFound))
    );

    assert_eq!(node.pools.transactions.len(), 3);
    for tx in txs.iter().filter(|tx| **tx != orphan) {
        assert!(node.pools.transactions.search_first_data(&node.tx_hash(tx)).is_some());
    }
    assert!(node.pools.transactions.search_first_data(&node.tx_hash(&orphan)).is_none());
    assert!(!node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(2))));
}

#[test]
fn test_redelivered_transaction_pooled_once() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let tx = node.signed_tx(&sender, 0);
    let payload = node.tx_batch(&[tx]);

    node.deliver(&node.tx_topic(1), payload.clone(), peer(1)).unwrap();
    node.deliver(&node.tx_topic(1), payload, peer(2)).unwrap();

    assert_eq!(node.pools.transactions.len(), 1);
}

#[test]
fn test_concurrent_redelivery_pooled_once() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let payload = node.tx_batch(&[node.signed_tx(&sender, 0)]);
    let topic = node.tx_topic(1);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = [peer(1), peer(2)]
        .into_iter()
        .map(|from| {
            let messenger = Arc::clone(&node.messenger);
            let barrier = Arc::clone(&barrier);
            let message = P2pMessage::new(&topic, payload.clone(), from);
            thread::spawn(move || {
                barrier.wait();
                messenger.deliver(&message)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(Ok(())));
    }
    assert_eq!(node.pools.transactions.len(), 1);
}

#[test]
fn test_own_shard_header_is_pooled() {
    let node = ShardNode::start(2, 0);
    let topic = TopicFamily::ShardBlocks.topic_between(0, METACHAIN_SHARD_ID);
    let raw = Marshalizer::bincode()
        .marshal(&valid_shard_header(0, TEST_CHAIN_ID))
        .unwrap();

    node.deliver(&topic, raw, peer(3)).unwrap();

    assert_eq!(node.pools.headers.len(), 1);
    assert_eq!(node.pools.headers.get_headers_by_nonce_and_shard_id(1, 0).len(), 1);
}

#[test]
fn test_foreign_shard_header_dropped_without_penalty() {
    let node = ShardNode::start(2, 0);
    let topic = TopicFamily::ShardBlocks.topic_between(0, 1);
    let raw = Marshalizer::bincode()
        .marshal(&valid_shard_header(1, TEST_CHAIN_ID))
        .unwrap();

    node.deliver(&topic, raw, peer(4)).unwrap();

    assert!(node.pools.headers.is_empty());
    // The sender can still talk to this node.
    let sender = node.sender_in_shard(1, 0);
    let tx = node.signed_tx(&sender, 0);
    assert!(node.deliver(&node.tx_topic(1), node.tx_batch(&[tx]), peer(4)).is_ok());
}
