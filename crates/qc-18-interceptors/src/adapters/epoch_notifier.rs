//! # Epoch Notifier
//!
//! Source of epoch confirmations. Registered handlers are called on every
//! confirmation; a `watch` channel additionally carries the latest
//! confirmed epoch as a snapshot for async consumers.

use crate::ports::{EpochConfirmedHandler, EpochStartTrigger};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

pub struct EpochNotifier {
    current: AtomicU32,
    handlers: RwLock<Vec<Arc<dyn EpochConfirmedHandler>>>,
    snapshot: watch::Sender<u32>,
}

impl EpochNotifier {
    pub fn new(initial_epoch: u32) -> Self {
        let (snapshot, _) = watch::channel(initial_epoch);
        Self {
            current: AtomicU32::new(initial_epoch),
            handlers: RwLock::new(Vec::new()),
            snapshot,
        }
    }

    /// Confirms `epoch` to every registered handler.
    ///
    /// Delivery is at-least-once; handlers must tolerate repeated and
    /// out-of-order epochs.
    pub fn notify_epoch(&self, epoch: u32) {
        self.current.store(epoch, Ordering::Release);
        self.snapshot.send_replace(epoch);

        // Clone so handlers may register further handlers.
        let handlers: Vec<_> = self.handlers.read().clone();
        debug!(epoch, handlers = handlers.len(), "epoch confirmed");
        for handler in handlers {
            handler.epoch_confirmed(epoch);
        }
    }

    /// Receiver holding the latest confirmed epoch.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.snapshot.subscribe()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for EpochNotifier {
    fn default() -> Self {
        Self::new(0)
    }
}

impl EpochStartTrigger for EpochNotifier {
    fn register_handler(&self, handler: Arc<dyn EpochConfirmedHandler>) {
        self.handlers.write().push(Arc::clone(&handler));
        handler.epoch_confirmed(self.epoch());
    }

    fn epoch(&self) -> u32 {
        self.current.load(Ordering::Acquire)
    }
}
