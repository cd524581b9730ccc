//! Ports layer for block pre-processing.
//!
//! - Inbound (Driving) ports: the pre-processor APIs the block processor calls
//! - Outbound (Driven) ports: execution, data requests and block limits

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
