//! # Pipeline Throttler
//!
//! Counting gate bounding how many decode/validate pipelines run at once,
//! system-wide. A slot is held by a `ThrottleGuard` and returned when the
//! guard drops, so every exit path of a pipeline releases it.

use crate::config::{ThrottlePolicy, ThrottlerConfig};
use crate::domain::FactoryError;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

pub struct Throttler {
    max_in_flight: usize,
    policy: ThrottlePolicy,
    in_flight: Mutex<usize>,
    released: Condvar,
    rejected: AtomicU64,
}

impl Throttler {
    pub fn new(max_in_flight: usize, policy: ThrottlePolicy) -> Result<Self, FactoryError> {
        if max_in_flight == 0 {
            return Err(FactoryError::InvalidThrottlerCapacity);
        }
        Ok(Self {
            max_in_flight,
            policy,
            in_flight: Mutex::new(0),
            released: Condvar::new(),
            rejected: AtomicU64::new(0),
        })
    }

    pub fn from_config(config: &ThrottlerConfig) -> Result<Self, FactoryError> {
        Self::new(config.max_concurrent_pipelines, config.policy)
    }

    /// Takes a slot according to the policy. `None` means the budget is
    /// exhausted; the rejection is counted.
    pub fn try_acquire(&self) -> Option<ThrottleGuard<'_>> {
        let mut in_flight = self.in_flight.lock();

        if let ThrottlePolicy::WaitUpTo { timeout } = self.policy {
            // A timeout past the clock's range waits without a deadline.
            let deadline = Instant::now().checked_add(timeout);
            while *in_flight >= self.max_in_flight {
                match deadline {
                    Some(deadline) => {
                        if self.released.wait_until(&mut in_flight, deadline).timed_out() {
                            break;
                        }
                    }
                    None => self.released.wait(&mut in_flight),
                }
            }
        }

        if *in_flight >= self.max_in_flight {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        *in_flight += 1;
        Some(ThrottleGuard { throttler: self })
    }

    pub fn can_process(&self) -> bool {
        *self.in_flight.lock() < self.max_in_flight
    }

    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Number of acquisitions refused so far.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    fn release(&self) {
        let mut in_flight = self.in_flight.lock();
        *in_flight = in_flight.saturating_sub(1);
        drop(in_flight);
        self.released.notify_one();
    }
}

impl std::fmt::Debug for Throttler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttler")
            .field("max_in_flight", &self.max_in_flight)
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight())
            .finish()
    }
}

/// One pipeline slot; released on drop.
#[must_use = "the slot is released as soon as the guard is dropped"]
pub struct ThrottleGuard<'a> {
    throttler: &'a Throttler,
}

impl Drop for ThrottleGuard<'_> {
    fn drop(&mut self) {
        self.throttler.release();
    }
}
