//! Epoch-activated feature flags.

use crate::ports::EpochConfirmedHandler;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// A capability enabled from `activation_epoch` onward.
///
/// Monotone: once set it stays set, later confirmations of older epochs
/// are ignored. Single writer (the epoch notifier), many readers; readers
/// may observe the new value up to one confirmation late.
#[derive(Debug)]
pub struct EpochFeatureFlag {
    name: &'static str,
    activation_epoch: u32,
    enabled: AtomicBool,
}

impl EpochFeatureFlag {
    pub fn new(name: &'static str, activation_epoch: u32) -> Self {
        Self {
            name,
            activation_epoch,
            enabled: AtomicBool::new(false),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn activation_epoch(&self) -> u32 {
        self.activation_epoch
    }
}

impl EpochConfirmedHandler for EpochFeatureFlag {
    fn epoch_confirmed(&self, epoch: u32) {
        if epoch >= self.activation_epoch {
            self.enabled.store(true, Ordering::Release);
        }
        debug!(
            flag = self.name,
            epoch,
            activation_epoch = self.activation_epoch,
            enabled = self.is_enabled(),
            "epoch confirmed"
        );
    }
}
