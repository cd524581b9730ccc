//! Ports layer for the Interceptors subsystem.
//!
//! - Inbound (Driving) ports: the message processing API the transport calls
//! - Outbound (Driven) ports: transport, consensus, crypto and epoch services

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
