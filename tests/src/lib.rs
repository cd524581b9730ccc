//! # Interception Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # A shard node wired from real containers
//! ├── integration/      # Gossip → pools → block assembly
//! └── exploits/         # Malformed, forged and flooding peers
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p qc-tests
//!
//! # By category
//! cargo test -p qc-tests integration::
//! cargo test -p qc-tests exploits::
//! ```

pub mod fixtures;

#[cfg(test)]
mod exploits;
#[cfg(test)]
mod integration;
