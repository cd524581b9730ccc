//! Block assembly over pools fed by the interceptors.

use crate::fixtures::{peer, ShardNode};
use qc_18_interceptors::P2pMessage;
use qc_19_preprocessors::mocks::{body_of, scr_to_shard, test_intermediate_container_args, MockTxProcessor};
use qc_19_preprocessors::{
    ArgPreProcessor, ChannelRequestHandler, DataRequest, IntermediateProcessorsContainerFactory,
    PreProcessor, PreProcessorsContainerFactory, PreProcessorsContainerFactoryArgs,
    PreprocessError, TransactionPreprocessor,
};
use shared_types::{BlockType, Body, Hash, UnitType};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn container_args(args: &ArgPreProcessor) -> PreProcessorsContainerFactoryArgs {
    let args = args.clone();
    PreProcessorsContainerFactoryArgs {
        shard_coordinator: Some(args.shard_coordinator),
        store: Some(args.store),
        marshalizer: Some(args.marshalizer),
        hasher: Some(args.hasher),
        data_pool: Some(args.data_pool),
        address_pubkey_converter: Some(args.address_pubkey_converter),
        accounts: Some(args.accounts),
        request_handler: Some(args.request_handler),
        tx_processor: Some(args.tx_processor),
        scr_processor: Some(args.scr_processor),
        reward_processor: Some(args.reward_processor),
        fee_handler: Some(args.fee_handler),
        gas_handler: Some(args.gas_handler),
        block_tracker: Some(args.block_tracker),
        block_size_computation: Some(args.block_size_computation),
    }
}

#[test]
fn test_missing_transaction_requested_then_intercepted() {
    let node = ShardNode::start(2, 0);
    let (mut args, requests) = node.preprocessor_args();
    let executed = Arc::new(MockTxProcessor::default());
    args.tx_processor = executed.clone();
    let pre = TransactionPreprocessor::new(&args);

    let sender = node.sender_in_shard(1, 0);
    let tx = node.signed_tx(&sender, 0);
    let hash = node.tx_hash(&tx);
    let body = body_of(BlockType::TxBlock, 1, 0, vec![hash]);

    let requested = pre.request_block_transactions(&body);
    assert_eq!(requested, 1);
    assert_eq!(requests.transaction_requests(), vec![(1, vec![hash])]);

    // The resolver answer arrives on the gossip topic.
    let messenger = node.messenger.clone();
    let message = P2pMessage::new(node.tx_topic(1), node.tx_batch(&[tx]), peer(1));
    let resolver = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        messenger.deliver(&message)
    });

    pre.is_data_prepared(requested, Duration::from_secs(5)).unwrap();
    assert_eq!(resolver.join().unwrap(), Some(Ok(())));

    pre.process_block_transactions(&body, &|| true).unwrap();
    assert_eq!(executed.processed(), 1);

    pre.save_tx_block_to_storage(&body).unwrap();
    assert!(node.store.has(UnitType::Transaction, &hash));
    pre.remove_tx_block_from_pools(&body).unwrap();
    assert!(node.pools.transactions.search_first_data(&hash).is_none());
}

#[test]
fn test_missing_transaction_never_arrives() {
    let node = ShardNode::start(2, 0);
    let (args, _) = node.preprocessor_args();
    let pre = TransactionPreprocessor::new(&args);
    let body = body_of(BlockType::TxBlock, 1, 0, vec![[0x5a; 32]]);

    let requested = pre.request_block_transactions(&body);
    assert_eq!(
        pre.is_data_prepared(requested, Duration::from_millis(20)),
        Err(PreprocessError::DataNotPrepared { missing: 1 })
    );
}

#[test]
fn test_intercepted_transactions_become_mini_block() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(0, 0);
    node.fund(&sender, 0);
    let txs: Vec<_> = (0..3).map(|nonce| node.signed_tx(&sender, nonce)).collect();
    node.deliver(&node.tx_topic(0), node.tx_batch(&txs), peer(1))
        .unwrap();

    let (args, _) = node.preprocessor_args();
    let container = PreProcessorsContainerFactory::new(container_args(&args))
        .and_then(|factory| factory.create())
        .unwrap();
    let pre = container.get(BlockType::TxBlock).unwrap();
    pre.create_block_started();

    let mini_blocks = pre.create_and_process_mini_blocks(&|| true).unwrap();
    assert_eq!(mini_blocks.len(), 1);
    assert_eq!(mini_blocks[0].sender_shard_id, 0);
    assert_eq!(mini_blocks[0].receiver_shard_id, 0);
    let expected: Vec<Hash> = txs.iter().map(|tx| node.tx_hash(tx)).collect();
    assert_eq!(mini_blocks[0].tx_hashes, expected);

    let body = Body { mini_blocks };
    pre.save_tx_block_to_storage(&body).unwrap();
    pre.remove_tx_block_from_pools(&body).unwrap();
    assert!(node.pools.transactions.is_empty());
    for hash in &expected {
        assert!(node.store.has(UnitType::Transaction, hash));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_channel_requests_served_by_async_resolver() {
    let node = ShardNode::start(2, 0);
    let sender = node.sender_in_shard(1, 0);
    let txs: Vec<_> = (0..2).map(|nonce| node.signed_tx(&sender, nonce)).collect();
    let hashes: Vec<Hash> = txs.iter().map(|tx| node.tx_hash(tx)).collect();

    // What the rest of the network would answer, keyed by hash.
    let network: HashMap<Hash, Vec<u8>> = txs
        .iter()
        .zip(&hashes)
        .map(|(tx, hash)| (*hash, node.tx_batch(std::slice::from_ref(tx))))
        .collect();

    let (handler, mut requests) = ChannelRequestHandler::new(8);
    let (mut args, _) = node.preprocessor_args();
    args.request_handler = Arc::new(handler);
    let pre = Arc::new(TransactionPreprocessor::new(&args));

    let messenger = node.messenger.clone();
    let topic = node.tx_topic(1);
    let expected = hashes.len();
    let resolver = tokio::spawn(async move {
        let mut served = 0;
        while served < expected {
            let Some(request) = requests.recv().await else {
                break;
            };
            let DataRequest::Transactions { shard_id, hashes } = request else {
                continue;
            };
            assert_eq!(shard_id, 1);
            for hash in hashes {
                let message = P2pMessage::new(topic.clone(), network[&hash].clone(), peer(7));
                let messenger = messenger.clone();
                tokio::task::spawn_blocking(move || messenger.deliver(&message))
                    .await
                    .unwrap();
                served += 1;
            }
        }
        served
    });

    let body = body_of(BlockType::TxBlock, 1, 0, hashes.clone());
    let assembled = {
        let pre = Arc::clone(&pre);
        tokio::task::spawn_blocking(move || {
            let requested = pre.request_block_transactions(&body);
            pre.is_data_prepared(requested, Duration::from_secs(5))?;
            pre.process_block_transactions(&body, &|| true)
        })
        .await
        .unwrap()
    };
    assert_eq!(assembled, Ok(()));
    assert_eq!(pre.get_all_current_used_txs().len(), 2);
    assert_eq!(resolver.await.unwrap(), 2);
}

#[test]
fn test_intermediate_results_round_trip_through_body() {
    let node = ShardNode::start(3, 0);
    let mut container_args = test_intermediate_container_args(3, 0);
    container_args.store = Some(node.store.clone());
    let container = IntermediateProcessorsContainerFactory::new(container_args)
        .and_then(|factory| factory.create())
        .unwrap();

    let results = container.get(BlockType::SmartContractResultBlock).unwrap();
    results.create_block_started();
    results
        .add_intermediate_transactions(vec![
            scr_to_shard(1, 1),
            scr_to_shard(2, 2),
            scr_to_shard(2, 3),
            scr_to_shard(0, 4),
        ])
        .unwrap();

    let mini_blocks = results.create_all_inter_mini_blocks().unwrap();
    let receivers: Vec<_> = mini_blocks.iter().map(|mb| mb.receiver_shard_id).collect();
    assert_eq!(receivers, vec![1, 2]);

    let body = Body { mini_blocks };
    results.verify_inter_mini_blocks(&body).unwrap();
    results.save_current_intermediate_txs_to_storage().unwrap();

    let fees = container.get(BlockType::TxFeeBlock).unwrap();
    fees.create_block_started();
    assert!(fees.create_all_inter_mini_blocks().unwrap().is_empty());
}
