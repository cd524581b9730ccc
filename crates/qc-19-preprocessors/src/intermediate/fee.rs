//! Collector of the fees paid in a block.
//!
//! The accumulated total is split between the round leader and the burn
//! address. The leader share is `total * pct / 100`, computed without
//! overflow; the burn address gets the remainder.

use super::ArgIntermediateProcessor;
use crate::domain::{FeeTransaction, PreprocessError};
use crate::ports::{IntermediateProcessor, SpecialAddressHandler};
use parking_lot::Mutex;
use shared_types::{
    calculate_hash, Address, BlockType, Body, ChainStorer, Hash, Hasher, Marshalizer, MiniBlock,
    ShardCoordinator, SmartContractResult, UnitType, U256,
};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Default)]
struct FeeState {
    total: U256,
    created: Vec<(Hash, FeeTransaction)>,
}

pub struct TxFeeCollector {
    shard_coordinator: Arc<ShardCoordinator>,
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
    special_address: Arc<dyn SpecialAddressHandler>,
    store: Arc<ChainStorer>,
    state: Mutex<FeeState>,
}

impl TxFeeCollector {
    pub fn new(args: &ArgIntermediateProcessor) -> Self {
        Self {
            shard_coordinator: Arc::clone(&args.shard_coordinator),
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
            special_address: Arc::clone(&args.special_address_handler),
            store: Arc::clone(&args.store),
            state: Mutex::new(FeeState::default()),
        }
    }

    /// Adds the fee paid by one executed transaction.
    pub fn process_transaction_fee(&self, fee: U256) {
        let mut state = self.state.lock();
        state.total = state.total.saturating_add(fee);
    }

    pub fn accumulated_fees(&self) -> U256 {
        self.state.lock().total
    }

    fn fee_transaction(&self, value: U256, receiver: Address) -> FeeTransaction {
        FeeTransaction {
            nonce: self.special_address.round(),
            value,
            receiver,
            shard_id: self.shard_coordinator.compute_id(&receiver),
        }
    }

    /// Leader and burn shares of `total`; zero shares are left out.
    fn split(&self, total: U256) -> Result<Vec<(Hash, FeeTransaction)>, PreprocessError> {
        let pct = U256::from(self.special_address.leader_fee_percentage().min(100));
        let hundred = U256::from(100u64);
        let leader_share = total / hundred * pct + (total % hundred) * pct / hundred;
        let burn_share = total - leader_share;

        [
            (leader_share, self.special_address.leader_address()),
            (burn_share, self.special_address.burn_address()),
        ]
        .into_iter()
        .filter(|(value, _)| !value.is_zero())
        .map(|(value, receiver)| {
            let fee_tx = self.fee_transaction(value, receiver);
            let hash = calculate_hash(&self.marshalizer, self.hasher.as_ref(), &fee_tx)?;
            Ok((hash, fee_tx))
        })
        .collect()
    }

    fn fee_mini_block(&self, fee_txs: &[(Hash, FeeTransaction)]) -> Option<MiniBlock> {
        if fee_txs.is_empty() {
            return None;
        }
        let self_id = self.shard_coordinator.self_id();
        Some(MiniBlock {
            tx_hashes: fee_txs.iter().map(|(hash, _)| *hash).collect(),
            sender_shard_id: self_id,
            receiver_shard_id: self_id,
            block_type: BlockType::TxFeeBlock,
        })
    }
}

impl IntermediateProcessor for TxFeeCollector {
    fn block_type(&self) -> BlockType {
        BlockType::TxFeeBlock
    }

    fn create_block_started(&self) {
        *self.state.lock() = FeeState::default();
    }

    /// Adds the values carried by fee-bearing results.
    fn add_intermediate_transactions(
        &self,
        txs: Vec<SmartContractResult>,
    ) -> Result<(), PreprocessError> {
        let mut state = self.state.lock();
        for scr in txs {
            state.total = state.total.saturating_add(scr.value);
        }
        Ok(())
    }

    fn create_all_inter_mini_blocks(&self) -> Result<Vec<MiniBlock>, PreprocessError> {
        let total = self.accumulated_fees();
        let fee_txs = self.split(total)?;
        let mini_block = self.fee_mini_block(&fee_txs);
        debug!(total = %total, shares = fee_txs.len(), "fee mini block created");
        self.state.lock().created = fee_txs;
        Ok(mini_block.into_iter().collect())
    }

    fn verify_inter_mini_blocks(&self, body: &Body) -> Result<(), PreprocessError> {
        let expected = self.fee_mini_block(&self.split(self.accumulated_fees())?);
        let received: Vec<&MiniBlock> = body
            .mini_blocks
            .iter()
            .filter(|mb| mb.block_type == BlockType::TxFeeBlock)
            .collect();

        let expected_count = usize::from(expected.is_some());
        if received.len() != expected_count {
            return Err(PreprocessError::MiniBlockCountMismatch {
                block_type: BlockType::TxFeeBlock,
                expected: expected_count,
                received: received.len(),
            });
        }
        match (expected, received.first()) {
            (Some(expected), Some(received)) if expected != **received => {
                warn!(receiver = received.receiver_shard_id, "fee mini block mismatch");
                Err(PreprocessError::MiniBlockMismatch {
                    receiver: received.receiver_shard_id,
                })
            }
            _ => Ok(()),
        }
    }

    fn save_current_intermediate_txs_to_storage(&self) -> Result<(), PreprocessError> {
        for (hash, fee_tx) in &self.state.lock().created {
            let bytes = self.marshalizer.marshal(fee_tx)?;
            self.store.put(UnitType::UnsignedTransaction, hash, bytes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{test_intermediate_args, MockSpecialAddressHandler};

    fn collector(leader_pct: u64) -> (TxFeeCollector, ArgIntermediateProcessor) {
        let mut args = test_intermediate_args(2, 0);
        args.special_address_handler = Arc::new(MockSpecialAddressHandler::new(leader_pct));
        (TxFeeCollector::new(&args), args)
    }

    fn shares(collector: &TxFeeCollector) -> Vec<FeeTransaction> {
        collector
            .state
            .lock()
            .created
            .iter()
            .map(|(_, tx)| tx.clone())
            .collect()
    }

    #[test]
    fn test_fees_split_between_leader_and_burn() {
        let (collector, _) = collector(40);
        collector.process_transaction_fee(U256::from(1_000u64));
        collector.process_transaction_fee(U256::from(50u64));

        let mini_blocks = collector.create_all_inter_mini_blocks().unwrap();
        assert_eq!(mini_blocks.len(), 1);
        assert_eq!(mini_blocks[0].block_type, BlockType::TxFeeBlock);
        assert_eq!(mini_blocks[0].tx_hashes.len(), 2);

        let shares = shares(&collector);
        assert_eq!(shares[0].value, U256::from(420u64));
        assert_eq!(shares[0].receiver, MockSpecialAddressHandler::LEADER);
        assert_eq!(shares[1].value, U256::from(630u64));
        assert_eq!(shares[1].receiver, MockSpecialAddressHandler::BURN);
        assert!(shares.iter().all(|tx| tx.nonce == MockSpecialAddressHandler::ROUND));
    }

    #[test]
    fn test_split_does_not_overflow() {
        let (collector, _) = collector(99);
        collector.process_transaction_fee(U256::MAX);
        collector.create_all_inter_mini_blocks().unwrap();

        let shares = shares(&collector);
        assert_eq!(shares[0].value + shares[1].value, U256::MAX);
    }

    #[test]
    fn test_zero_shares_dropped() {
        let (collector, _) = collector(100);
        collector.process_transaction_fee(U256::from(7u64));
        collector.create_all_inter_mini_blocks().unwrap();
        assert_eq!(shares(&collector).len(), 1);

        collector.create_block_started();
        assert!(collector.create_all_inter_mini_blocks().unwrap().is_empty());
    }

    #[test]
    fn test_results_add_to_total() {
        let (collector, _) = collector(50);
        let mut scr = crate::mocks::scr_to_shard(1, 1);
        scr.value = U256::from(10u64);
        collector
            .add_intermediate_transactions(vec![scr.clone(), scr])
            .unwrap();
        assert_eq!(collector.accumulated_fees(), U256::from(20u64));
    }

    #[test]
    fn test_verify_matches_local_computation() {
        let (collector, _) = collector(40);
        collector.process_transaction_fee(U256::from(1_000u64));
        let mini_blocks = collector.create_all_inter_mini_blocks().unwrap();
        assert!(collector
            .verify_inter_mini_blocks(&Body {
                mini_blocks: mini_blocks.clone()
            })
            .is_ok());

        let mut tampered = mini_blocks;
        tampered[0].tx_hashes.reverse();
        assert_eq!(
            collector.verify_inter_mini_blocks(&Body {
                mini_blocks: tampered
            }),
            Err(PreprocessError::MiniBlockMismatch { receiver: 0 })
        );
        assert!(matches!(
            collector.verify_inter_mini_blocks(&Body::default()),
            Err(PreprocessError::MiniBlockCountMismatch { expected: 1, received: 0, .. })
        ));
    }

    #[test]
    fn test_save_stores_created_fee_transactions() {
        let (collector, args) = collector(40);
        collector.process_transaction_fee(U256::from(1_000u64));
        let mini_blocks = collector.create_all_inter_mini_blocks().unwrap();
        collector.save_current_intermediate_txs_to_storage().unwrap();

        for hash in &mini_blocks[0].tx_hashes {
            assert!(args.store.has(UnitType::UnsignedTransaction, hash));
        }
    }
}
