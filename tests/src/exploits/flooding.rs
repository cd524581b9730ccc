use crate::fixtures::{peer, ShardNode};
use qc_18_interceptors::config::AntifloodConfig;
use qc_18_interceptors::{InterceptorError, P2pAntiflood};
use std::sync::Arc;

fn node_with_peer_quota(messages_per_second: u32) -> ShardNode {
    ShardNode::start_with(2, 0, |args| {
        let blacklist = args.blacklist.clone().expect("blacklist set by the node");
        let config = AntifloodConfig {
            peer_max_messages_per_second: messages_per_second,
            ..AntifloodConfig::default()
        };
        args.antiflood = Some(Arc::new(P2pAntiflood::new(config, blacklist)));
    })
}

#[test]
fn test_peer_over_quota_is_cut_off() {
    let node = node_with_peer_quota(3);
    let sender = node.sender_in_shard(1, 0);
    let topic = node.tx_topic(1);

    let results: Vec<_> = (0..6)
        .map(|nonce| {
            let tx = node.signed_tx(&sender, nonce);
            node.deliver(&topic, node.tx_batch(&[tx]), peer(1))
        })
        .collect();

    assert!(results[..3].iter().all(Result::is_ok));
    assert!(results[3..]
        .iter()
        .all(|r| *r == Err(InterceptorError::FloodRejected)));
    assert_eq!(node.pools.transactions.len(), 3);
}

#[test]
fn test_flooding_peer_does_not_starve_others() {
    let node = node_with_peer_quota(2);
    let sender = node.sender_in_shard(1, 0);
    let topic = node.tx_topic(1);
    let payload = node.tx_batch(&[node.signed_tx(&sender, 0)]);

    for _ in 0..10 {
        let _ = node.deliver(&topic, payload.clone(), peer(1));
    }
    assert_eq!(
        node.deliver(&topic, payload.clone(), peer(1)),
        Err(InterceptorError::FloodRejected)
    );

    let honest = node.tx_batch(&[node.signed_tx(&sender, 1)]);
    node.deliver(&topic, honest, peer(2)).unwrap();
    assert_eq!(node.pools.transactions.len(), 2);
}

#[test]
fn test_oversized_message_rejected_before_decoding() {
    let node = ShardNode::start_with(2, 0, |args| {
        let blacklist = args.blacklist.clone().expect("blacklist set by the node");
        let config = AntifloodConfig {
            peer_max_total_size_per_second: 64,
            ..AntifloodConfig::default()
        };
        args.antiflood = Some(Arc::new(P2pAntiflood::new(config, blacklist)));
    });

    // Not even decodable, yet no ban: the size gate fired first.
    assert_eq!(
        node.deliver(&node.tx_topic(1), vec![0xff; 4096], peer(6)),
        Err(InterceptorError::FloodRejected)
    );
    assert!(node.pools.transactions.is_empty());
}
