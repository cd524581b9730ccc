//! # Quantum Telemetry
//!
//! Logging setup shared by the node's subsystems. Every crate logs through
//! `tracing` macros with structured fields; this crate installs the global
//! subscriber once at startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quantum_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&TelemetryConfig::from_env())?;
//!     // Subsystem logs are now written to the console.
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `QC_CONSOLE_OUTPUT` | `true` | Write logs to the console |
//! | `QC_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("A global subscriber is already installed")]
    AlreadyInitialised,

    #[error("Invalid configuration: {0}")]
    Config(String),
}
