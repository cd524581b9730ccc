//! Interceptor for topics carrying one object per message.

use super::{ArgInterceptor, InterceptorBase};
use crate::domain::{FactoryError, InterceptorError};
use crate::ports::{MessageProcessor, P2pMessage};

pub struct SingleDataInterceptor {
    base: InterceptorBase,
}

impl SingleDataInterceptor {
    pub fn new(args: ArgInterceptor) -> Result<Self, FactoryError> {
        Ok(Self {
            base: InterceptorBase::new(args)?,
        })
    }

    pub fn topic(&self) -> &str {
        &self.base.args.topic
    }
}

impl MessageProcessor for SingleDataInterceptor {
    fn process_received_message(&self, message: &P2pMessage) -> Result<(), InterceptorError> {
        self.base.admit(message)?;
        let _slot = self
            .base
            .args
            .throttler
            .try_acquire()
            .ok_or(InterceptorError::SystemBusy)?;

        let data = self
            .base
            .args
            .factory
            .create(&message.data)
            .map_err(|e| self.base.reject(message, e))?;
        let validated = data.validate().map_err(|e| self.base.reject(message, e))?;

        if !self.base.is_relevant(&validated) {
            return Ok(());
        }

        let processor = &self.base.args.processor;
        processor.validate(&validated)?;
        processor.save(&validated, &message.peer)?;
        Ok(())
    }
}
