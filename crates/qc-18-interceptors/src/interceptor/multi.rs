//! Interceptor for topics carrying a marshalled `Batch` of objects.
//!
//! Decoding and validation are all-or-nothing: one element failing either
//! rejects the whole message. Processor checks are per element: an element
//! the processor refuses is skipped, the others are still saved and the
//! first refusal is reported.

use super::{ArgInterceptor, InterceptorBase};
use crate::domain::intercepted::hex_prefix;
use crate::domain::{DataError, FactoryError, InterceptorError, ValidatedData};
use crate::ports::{MessageProcessor, P2pMessage};
use rayon::prelude::*;
use shared_types::{Batch, Marshalizer};
use tracing::debug;

/// Batches at least this large are validated on the rayon pool.
pub const PARALLEL_VALIDATION_THRESHOLD: usize = 16;

pub struct MultiDataInterceptor {
    base: InterceptorBase,
    marshalizer: Marshalizer,
}

impl MultiDataInterceptor {
    pub fn new(args: ArgInterceptor, marshalizer: Marshalizer) -> Result<Self, FactoryError> {
        Ok(Self {
            base: InterceptorBase::new(args)?,
            marshalizer,
        })
    }

    pub fn topic(&self) -> &str {
        &self.base.args.topic
    }

    fn decode_and_validate(&self, raw: &[u8]) -> Result<ValidatedData, DataError> {
        self.base.args.factory.create(raw)?.validate()
    }

    fn validate_batch(&self, batch: &Batch) -> Result<Vec<ValidatedData>, DataError> {
        if batch.data.len() >= PARALLEL_VALIDATION_THRESHOLD {
            batch
                .data
                .par_iter()
                .map(|raw| self.decode_and_validate(raw))
                .collect()
        } else {
            batch
                .data
                .iter()
                .map(|raw| self.decode_and_validate(raw))
                .collect()
        }
    }
}

impl MessageProcessor for MultiDataInterceptor {
    fn process_received_message(&self, message: &P2pMessage) -> Result<(), InterceptorError> {
        self.base.admit(message)?;
        let _slot = self
            .base
            .args
            .throttler
            .try_acquire()
            .ok_or(InterceptorError::SystemBusy)?;

        let batch: Batch = self
            .marshalizer
            .unmarshal(&message.data)
            .map_err(|e| self.base.reject(message, e.into()))?;
        if batch.data.is_empty() {
            return Err(self.base.reject(message, DataError::EmptyBatch));
        }

        let validated = self
            .validate_batch(&batch)
            .map_err(|e| self.base.reject(message, e))?;
        let relevant: Vec<ValidatedData> = validated
            .into_iter()
            .filter(|data| self.base.is_relevant(data))
            .collect();

        let processor = &self.base.args.processor;
        let mut first_refusal = None;
        for data in &relevant {
            let outcome = processor
                .validate(data)
                .and_then(|()| processor.save(data, &message.peer));
            if let Err(e) = outcome {
                debug!(
                    topic = %message.topic,
                    hash = %hex_prefix(data.hash()),
                    error = %e,
                    "batch element refused by processor"
                );
                first_refusal.get_or_insert(e);
            }
        }
        match first_refusal {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{test_interceptor_args, CountingDataFactory, CountingProcessor};
    use crate::ports::{BlacklistHandler, BlacklistIdentity};
    use crate::domain::ProcessorError;
    use shared_types::{Hasher, PeerId, Sha256Hasher};
    use std::sync::Arc;

    fn batch_message(items: Vec<Vec<u8>>) -> P2pMessage {
        let raw = Marshalizer::bincode().marshal(&Batch { data: items }).unwrap();
        P2pMessage::new("batch", raw, PeerId::new([3u8; 32]))
    }

    fn interceptor(
        factory: Arc<CountingDataFactory>,
        processor: Arc<CountingProcessor>,
    ) -> MultiDataInterceptor {
        let mut args = test_interceptor_args("batch", factory);
        args.processor = processor;
        MultiDataInterceptor::new(args, Marshalizer::bincode()).unwrap()
    }

    #[test]
    fn test_every_element_saved() {
        let factory = Arc::new(CountingDataFactory::valid());
        let processor = Arc::new(CountingProcessor::default());
        let interceptor = interceptor(factory.clone(), processor.clone());

        interceptor
            .process_received_message(&batch_message(vec![vec![1], vec![2], vec![3]]))
            .unwrap();
        assert_eq!(factory.calls(), 3);
        assert_eq!(processor.saved(), 3);
    }

    #[test]
    fn test_large_batch_validated_in_parallel() {
        let factory = Arc::new(CountingDataFactory::valid());
        let processor = Arc::new(CountingProcessor::default());
        let interceptor = interceptor(factory.clone(), processor.clone());
        let items = (0..64u8).map(|i| vec![i + 1]).collect();

        interceptor
            .process_received_message(&batch_message(items))
            .unwrap();
        assert_eq!(processor.saved(), 64);
    }

    #[test]
    fn test_one_bad_element_rejects_whole_batch() {
        let factory = Arc::new(CountingDataFactory::valid().failing_on(vec![0xee]));
        let processor = Arc::new(CountingProcessor::default());
        let interceptor = interceptor(factory, processor.clone());

        let result = interceptor
            .process_received_message(&batch_message(vec![vec![1], vec![0xee], vec![3]]));
        assert!(matches!(result, Err(InterceptorError::Data(_))));
        assert_eq!(processor.saved(), 0);
    }

    #[test]
    fn test_refused_element_does_not_drop_siblings() {
        let factory = Arc::new(CountingDataFactory::valid());
        let refused = Sha256Hasher.compute(&[2]);
        let processor = Arc::new(CountingProcessor::refusing(refused));
        let args = test_interceptor_args("batch", factory);
        let blacklist = args.blacklist.clone();
        let interceptor = {
            let mut args = args;
            args.processor = processor.clone();
            MultiDataInterceptor::new(args, Marshalizer::bincode()).unwrap()
        };

        let result = interceptor
            .process_received_message(&batch_message(vec![vec![1], vec![2], vec![3]]));
        assert_eq!(
            result,
            Err(InterceptorError::Processor(ProcessorError::AccountNotFound))
        );
        assert_eq!(processor.validated(), 3);
        assert_eq!(processor.saved(), 2);
        assert!(!blacklist.is_blacklisted(&BlacklistIdentity::Peer(PeerId::new([3u8; 32]))));
    }

    #[test]
    fn test_empty_batch_rejected_and_blacklisted() {
        let factory = Arc::new(CountingDataFactory::valid());
        let args = test_interceptor_args("batch", factory);
        let blacklist = args.blacklist.clone();
        let interceptor = MultiDataInterceptor::new(args, Marshalizer::bincode()).unwrap();

        assert_eq!(
            interceptor.process_received_message(&batch_message(vec![])),
            Err(InterceptorError::Data(DataError::EmptyBatch))
        );
        assert!(blacklist.is_blacklisted(&BlacklistIdentity::Peer(PeerId::new([3u8; 32]))));
    }

    #[test]
    fn test_garbage_batch_rejected() {
        let factory = Arc::new(CountingDataFactory::valid());
        let interceptor = interceptor(factory.clone(), Arc::new(CountingProcessor::default()));
        let msg = P2pMessage::new("batch", vec![0xff; 9], PeerId::default());
        assert!(matches!(
            interceptor.process_received_message(&msg),
            Err(InterceptorError::Data(DataError::Codec(_)))
        ));
        assert_eq!(factory.calls(), 0);
    }
}
