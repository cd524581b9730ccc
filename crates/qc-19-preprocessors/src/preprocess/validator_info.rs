//! Validator-info pre-processor.
//!
//! Peer-block mini-blocks are self-contained: nothing is ever requested from
//! peers and nothing is executed. Saving a block stores its peer
//! mini-blocks; removing it evicts the referenced validator infos.

use super::ArgPreProcessor;
use crate::domain::{BlockTransaction, PreprocessError};
use crate::ports::PreProcessor;
use shared_types::{
    BlockType, Body, Cacher, ChainStorer, Hash, Hasher, Marshalizer, MiniBlock, UnitType,
    ValidatorInfo,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct ValidatorInfoPreprocessor {
    validator_infos: Arc<Cacher<ValidatorInfo>>,
    store: Arc<ChainStorer>,
    marshalizer: Marshalizer,
    hasher: Arc<dyn Hasher>,
}

impl ValidatorInfoPreprocessor {
    pub fn new(args: &ArgPreProcessor) -> Self {
        Self {
            validator_infos: Arc::clone(&args.data_pool.validator_infos),
            store: Arc::clone(&args.store),
            marshalizer: args.marshalizer.clone(),
            hasher: Arc::clone(&args.hasher),
        }
    }

    fn peer_mini_blocks<'a>(body: &'a Body) -> impl Iterator<Item = &'a MiniBlock> {
        body.mini_blocks
            .iter()
            .filter(|mb| mb.block_type == BlockType::PeerBlock)
    }
}

impl PreProcessor for ValidatorInfoPreprocessor {
    fn block_type(&self) -> BlockType {
        BlockType::PeerBlock
    }

    fn create_block_started(&self) {}

    fn request_block_transactions(&self, _body: &Body) -> usize {
        0
    }

    fn is_data_prepared(&self, _requested: usize, _timeout: Duration) -> Result<(), PreprocessError> {
        Ok(())
    }

    fn process_block_transactions(
        &self,
        body: &Body,
        have_time: &dyn Fn() -> bool,
    ) -> Result<(), PreprocessError> {
        if Self::peer_mini_blocks(body).next().is_some() && !have_time() {
            return Err(PreprocessError::TimeIsOut);
        }
        Ok(())
    }

    fn save_tx_block_to_storage(&self, body: &Body) -> Result<(), PreprocessError> {
        for mb in Self::peer_mini_blocks(body) {
            let bytes = self.marshalizer.marshal(mb)?;
            let hash = self.hasher.compute(&bytes);
            self.store.put(UnitType::PeerChange, &hash, bytes)?;
        }
        Ok(())
    }

    fn remove_tx_block_from_pools(&self, body: &Body) -> Result<(), PreprocessError> {
        Self::peer_mini_blocks(body)
            .flat_map(|mb| mb.tx_hashes.iter())
            .for_each(|hash| self.validator_infos.remove(hash));
        Ok(())
    }

    fn create_and_process_mini_blocks(
        &self,
        _have_time: &dyn Fn() -> bool,
    ) -> Result<Vec<MiniBlock>, PreprocessError> {
        Ok(Vec::new())
    }

    fn get_all_current_used_txs(&self) -> HashMap<Hash, BlockTransaction> {
        HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{body_of, test_preprocessor_args};
    use shared_types::{calculate_hash, U256};

    fn validator_info(index: u32) -> ValidatorInfo {
        ValidatorInfo {
            public_key: vec![index as u8; 32],
            shard_id: 0,
            list: "eligible".into(),
            index,
            rating: 50,
            leader_success: 1,
            validator_success: 10,
            accumulated_fees: U256::zero(),
        }
    }

    #[test]
    fn test_never_requests() {
        let (args, requests) = test_preprocessor_args(2, 0);
        let pre = ValidatorInfoPreprocessor::new(&args);
        let body = body_of(BlockType::PeerBlock, 0, 0, vec![[1u8; 32]]);

        assert_eq!(pre.request_block_transactions(&body), 0);
        assert!(pre.is_data_prepared(0, Duration::ZERO).is_ok());
        assert!(requests.is_empty());
    }

    #[test]
    fn test_save_stores_peer_mini_blocks() {
        let (args, _) = test_preprocessor_args(2, 0);
        let pre = ValidatorInfoPreprocessor::new(&args);
        let body = body_of(BlockType::PeerBlock, 0, 0, vec![[1u8; 32]]);

        pre.save_tx_block_to_storage(&body).unwrap();
        let mb_hash =
            calculate_hash(&args.marshalizer, args.hasher.as_ref(), &body.mini_blocks[0]).unwrap();
        assert!(args.store.has(UnitType::PeerChange, &mb_hash));
    }

    #[test]
    fn test_remove_evicts_validator_infos() {
        let (args, _) = test_preprocessor_args(2, 0);
        let pre = ValidatorInfoPreprocessor::new(&args);
        let info = validator_info(3);
        let hash = calculate_hash(&args.marshalizer, args.hasher.as_ref(), &info).unwrap();
        args.data_pool.validator_infos.put(hash, info);

        pre.remove_tx_block_from_pools(&body_of(BlockType::PeerBlock, 0, 0, vec![hash]))
            .unwrap();
        assert!(!args.data_pool.validator_infos.has(&hash));
    }

    #[test]
    fn test_process_checks_time_only_with_peer_blocks() {
        let (args, _) = test_preprocessor_args(2, 0);
        let pre = ValidatorInfoPreprocessor::new(&args);

        assert!(pre.process_block_transactions(&Body::default(), &|| false).is_ok());
        assert_eq!(
            pre.process_block_transactions(&body_of(BlockType::PeerBlock, 0, 0, vec![]), &|| false),
            Err(PreprocessError::TimeIsOut)
        );
    }
}
