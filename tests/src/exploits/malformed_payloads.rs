use crate::fixtures::{peer, ShardNode};
use qc_18_interceptors::domain::DataError;
use qc_18_interceptors::ports::{BlacklistHandler, BlacklistIdentity};
use qc_18_interceptors::InterceptorError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::{Batch, Marshalizer};

#[test]
fn test_random_bytes_blacklist_sender() {
    let node = ShardNode::start(2, 0);
    let topic = node.tx_topic(1);
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for id in 1..=32u8 {
        let len = rng.gen_range(1..=256);
        let mut garbage = vec![0u8; len];
        rng.fill(&mut garbage[..]);

        let result = node.deliver(&topic, garbage, peer(id));
        assert!(matches!(result, Err(InterceptorError::Data(_))), "{result:?}");
        assert!(node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(id))));
    }
    assert!(node.pools.transactions.is_empty());
}

#[test]
fn test_blacklisted_peer_cannot_send_valid_data() {
    let node = ShardNode::start(2, 0);
    let topic = node.tx_topic(1);
    node.deliver(&topic, vec![0xff; 9], peer(1)).unwrap_err();

    let sender = node.sender_in_shard(1, 0);
    let tx = node.signed_tx(&sender, 0);
    assert_eq!(
        node.deliver(&topic, node.tx_batch(&[tx.clone()]), peer(1)),
        Err(InterceptorError::Blacklisted)
    );
    assert!(node.pools.transactions.is_empty());

    // An honest peer relaying the same transaction is unaffected.
    node.deliver(&topic, node.tx_batch(&[tx]), peer(2)).unwrap();
    assert_eq!(node.pools.transactions.len(), 1);
}

#[test]
fn test_empty_batch_is_rejected() {
    let node = ShardNode::start(2, 0);
    let empty = Marshalizer::bincode()
        .marshal(&Batch { data: Vec::new() })
        .unwrap();

    assert_eq!(
        node.deliver(&node.tx_topic(1), empty, peer(3)),
        Err(InterceptorError::Data(DataError::EmptyBatch))
    );
    assert!(node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(3))));
}

#[test]
fn test_empty_message_is_not_a_ban() {
    let node = ShardNode::start(2, 0);

    assert_eq!(
        node.deliver(&node.tx_topic(1), Vec::new(), peer(4)),
        Err(InterceptorError::EmptyMessage)
    );
    assert!(!node.blacklist.is_blacklisted(&BlacklistIdentity::Peer(peer(4))));
}

#[test]
fn test_one_bad_element_poisons_whole_batch() {
    let node = ShardNode::start(2, 0);
    let marshalizer = Marshalizer::bincode();
    let sender = node.sender_in_shard(1, 0);
    let good: Vec<Vec<u8>> = (0..4)
        .map(|nonce| marshalizer.marshal(&node.signed_tx(&sender, nonce)).unwrap())
        .collect();

    let mut data = good.clone();
    data.insert(2, vec![0xde, 0xad, 0xbe, 0xef]);
    let poisoned = marshalizer.marshal(&Batch { data }).unwrap();

    let result = node.deliver(&node.tx_topic(1), poisoned, peer(5));
    assert!(matches!(result, Err(InterceptorError::Data(DataError::Codec(_)))), "{result:?}");
    assert!(node.pools.transactions.is_empty());
}
