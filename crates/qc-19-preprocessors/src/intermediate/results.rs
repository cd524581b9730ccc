//! Collector of smart-contract results bound for other shards.

use super::ArgIntermediateProcessor;
use crate::domain::PreprocessError;
use crate::ports::IntermediateProcessor;
use parking_lot::Mutex;
use shared_types::{
    calculate_hash, BlockType, Body, ChainStorer, Hash, Hasher, Marshalizer, MiniBlock,
    PubkeyConverter, ShardCoordinator, ShardId, SmartContractResult, UnitType,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

struct CollectedResult {
    scr: SmartContractResult,
    receiver_shard: ShardId,
}

pub struct IntermediateResultsProcessor {
    shard_coordinator: Arc<ShardCoordinator>,
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    pubkey_converter: Arc<dyn PubkeyConverter>,
    store: Arc<ChainStorer>,
    results: Mutex<HashMap<Hash, CollectedResult>>,
}

impl IntermediateResultsProcessor {
    pub fn new(args: &ArgIntermediateProcessor) -> Self {
        Self {
            shard_coordinator: Arc::clone(&args.shard_coordinator),
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            pubkey_converter: Arc::clone(&args.address_pubkey_converter),
            store: Arc::clone(&args.store),
            results: Mutex::new(HashMap::new()),
        }
    }

    fn check_address(&self, address: &[u8]) -> Result<(), PreprocessError> {
        let expected = self.pubkey_converter.address_len();
        if address.len() != expected {
            return Err(PreprocessError::InvalidAddress {
                expected,
                actual: address.len(),
            });
        }
        Ok(())
    }

    /// Collected hashes per receiver shard, other shards only.
    fn cross_shard_hashes(&self) -> BTreeMap<ShardId, Vec<Hash>> {
        let self_id = self.shard_coordinator.self_id();
        let mut by_receiver: BTreeMap<ShardId, Vec<Hash>> = BTreeMap::new();
        for (hash, result) in self.results.lock().iter() {
            if result.receiver_shard != self_id {
                by_receiver.entry(result.receiver_shard).or_default().push(*hash);
            }
        }
        by_receiver.values_mut().for_each(|hashes| hashes.sort_unstable());
        by_receiver
    }

    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

impl IntermediateProcessor for IntermediateResultsProcessor {
    fn block_type(&self) -> BlockType {
        BlockType::SmartContractResultBlock
    }

    fn create_block_started(&self) {
        self.results.lock().clear();
    }

    fn add_intermediate_transactions(
        &self,
        txs: Vec<SmartContractResult>,
    ) -> Result<(), PreprocessError> {
        let mut collected = Vec::with_capacity(txs.len());
        for scr in txs {
            self.check_address(&scr.sender)?;
            self.check_address(&scr.receiver)?;
            let hash = calculate_hash(&self.marshalizer, self.hasher.as_ref(), &scr)?;
            let receiver_shard = self.shard_coordinator.compute_id(&scr.receiver);
            collected.push((hash, CollectedResult { scr, receiver_shard }));
        }
        self.results.lock().extend(collected);
        Ok(())
    }

    fn create_all_inter_mini_blocks(&self) -> Result<Vec<MiniBlock>, PreprocessError> {
        let self_id = self.shard_coordinator.self_id();
        Ok(self
            .cross_shard_hashes()
            .into_iter()
            .map(|(receiver, tx_hashes)| MiniBlock {
                tx_hashes,
                sender_shard_id: self_id,
                receiver_shard_id: receiver,
                block_type: BlockType::SmartContractResultBlock,
            })
            .collect())
    }

    fn verify_inter_mini_blocks(&self, body: &Body) -> Result<(), PreprocessError> {
        let self_id = self.shard_coordinator.self_id();
        let expected = self.cross_shard_hashes();
        let received: Vec<&MiniBlock> = body
            .mini_blocks
            .iter()
            .filter(|mb| {
                mb.block_type == BlockType::SmartContractResultBlock
                    && mb.receiver_shard_id != self_id
            })
            .collect();

        if received.len() != expected.len() {
            return Err(PreprocessError::MiniBlockCountMismatch {
                block_type: BlockType::SmartContractResultBlock,
                expected: expected.len(),
                received: received.len(),
            });
        }
        for mb in received {
            let mut hashes = mb.tx_hashes.clone();
            hashes.sort_unstable();
            if expected.get(&mb.receiver_shard_id) != Some(&hashes) {
                debug!(receiver = mb.receiver_shard_id, "result mini block mismatch");
                return Err(PreprocessError::MiniBlockMismatch {
                    receiver: mb.receiver_shard_id,
                });
            }
        }
        Ok(())
    }

    fn save_current_intermediate_txs_to_storage(&self) -> Result<(), PreprocessError> {
        for (hash, result) in self.results.lock().iter() {
            let bytes = self.marshalizer.marshal(&result.scr)?;
            self.store.put(UnitType::UnsignedTransaction, hash, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{scr_to_shard, test_intermediate_args};

    #[test]
    fn test_cross_shard_results_grouped_by_receiver() {
        let args = test_intermediate_args(3, 0);
        let processor = IntermediateResultsProcessor::new(&args);
        processor
            .add_intermediate_transactions(vec![
                scr_to_shard(2, 1),
                scr_to_shard(1, 2),
                scr_to_shard(1, 3),
                // Same-shard results stay local.
                scr_to_shard(0, 4),
            ])
            .unwrap();

        let mini_blocks = processor.create_all_inter_mini_blocks().unwrap();
        assert_eq!(mini_blocks.len(), 2);
        assert_eq!(mini_blocks[0].receiver_shard_id, 1);
        assert_eq!(mini_blocks[0].tx_hashes.len(), 2);
        assert_eq!(mini_blocks[1].receiver_shard_id, 2);
        assert!(mini_blocks.iter().all(|mb| mb.sender_shard_id == 0));
        assert_eq!(processor.len(), 4);
    }

    #[test]
    fn test_verify_accepts_own_mini_blocks() {
        let args = test_intermediate_args(3, 0);
        let processor = IntermediateResultsProcessor::new(&args);
        processor
            .add_intermediate_transactions(vec![scr_to_shard(1, 1), scr_to_shard(2, 2)])
            .unwrap();
        let body = Body {
            mini_blocks: processor.create_all_inter_mini_blocks().unwrap(),
        };
        assert!(processor.verify_inter_mini_blocks(&body).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_mini_block() {
        let args = test_intermediate_args(3, 0);
        let processor = IntermediateResultsProcessor::new(&args);
        processor
            .add_intermediate_transactions(vec![scr_to_shard(1, 1)])
            .unwrap();
        let mut mini_blocks = processor.create_all_inter_mini_blocks().unwrap();
        mini_blocks[0].tx_hashes.push([0xaa; 32]);

        assert_eq!(
            processor.verify_inter_mini_blocks(&Body { mini_blocks }),
            Err(PreprocessError::MiniBlockMismatch { receiver: 1 })
        );
    }

    #[test]
    fn test_verify_rejects_missing_mini_block() {
        let args = test_intermediate_args(3, 0);
        let processor = IntermediateResultsProcessor::new(&args);
        processor
            .add_intermediate_transactions(vec![scr_to_shard(1, 1)])
            .unwrap();

        assert!(matches!(
            processor.verify_inter_mini_blocks(&Body::default()),
            Err(PreprocessError::MiniBlockCountMismatch { expected: 1, received: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_address_length_rejected() {
        let mut args = test_intermediate_args(2, 0);
        args.address_pubkey_converter = Arc::new(shared_types::HexPubkeyConverter::new(20));
        let processor = IntermediateResultsProcessor::new(&args);

        assert_eq!(
            processor.add_intermediate_transactions(vec![scr_to_shard(1, 1)]),
            Err(PreprocessError::InvalidAddress {
                expected: 20,
                actual: 32
            })
        );
        assert!(processor.is_empty());
    }

    #[test]
    fn test_save_and_reset() {
        let args = test_intermediate_args(2, 0);
        let processor = IntermediateResultsProcessor::new(&args);
        let scr = scr_to_shard(1, 1);
        let hash = calculate_hash(&args.marshalizer, args.hasher.as_ref(), &scr).unwrap();
        processor.add_intermediate_transactions(vec![scr]).unwrap();

        processor.save_current_intermediate_txs_to_storage().unwrap();
        assert!(args.store.has(UnitType::UnsignedTransaction, &hash));

        processor.create_block_started();
        assert!(processor.create_all_inter_mini_blocks().unwrap().is_empty());
    }
}
