//! # Quantum Telemetry
//!
//! Structured logging for Quantum-Chain services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quantum_telemetry::{TelemetryConfig, init_telemetry};
//!
//! fn main() -> Result<(), quantum_telemetry::TelemetryError> {
//!     let config = TelemetryConfig::for_subsystem("17", "block-stream")?;
//!     let _guard = init_telemetry(config)?;
//!
//!     // Logs are now routed through the global subscriber
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `QC_SERVICE_NAME` | `quantum-chain` | Service name in log lines |
//! | `QC_LOG_LEVEL` | `info` | Filter used when `RUST_LOG` is unset |
//! | `QC_LOG_FORMAT` | `pretty` | `pretty`, `json` or `off` |
//! | `QC_SUBSYSTEM_ID` | `00` | Subsystem identifier |

mod config;
mod logging;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::{build_env_filter, init_logging, StructuredLogger};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for a service.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let logger = logging::init_logging(&config)?;
    Ok(TelemetryGuard { logger })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    logger: StructuredLogger,
}

impl TelemetryGuard {
    /// Service name logging was installed for.
    pub fn service_name(&self) -> &str {
        self.logger.service_name()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.logger.service_name(), "Shutting down telemetry");
    }
}

/// Convenience macro for creating a span with subsystem context.
///
/// # Example
///
/// ```rust,ignore
/// use quantum_telemetry::subsystem_span;
///
/// fn close_block() {
///     let _span = subsystem_span!("close_block", subsystem = "block-stream", block_number = 12345);
/// }
/// ```
#[macro_export]
macro_rules! subsystem_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "quantum-chain");
    }

    #[test]
    fn test_subsystem_span_macro() {
        let span = subsystem_span!("close_block", subsystem = "block-stream", block_number = 1u64);
        let _entered = span.enter();
    }
}
