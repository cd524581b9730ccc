//! Flows crossing the interception and pre-processing subsystems.

mod block_assembly;
mod interception_flow;
