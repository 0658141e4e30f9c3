//! Structured logging setup.
//!
//! Logs are emitted through `tracing`; this module installs the global
//! subscriber. JSON output carries consistent fields a log shipper can parse:
//! - `timestamp`, `level`, `target`
//! - `fields.message` plus structured fields (`block_number`, `block_hash`, ...)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{LogFormat, TelemetryConfig, TelemetryError};

/// Structured logger handle
pub struct StructuredLogger {
    service_name: String,
    json: bool,
}

impl StructuredLogger {
    /// Service name the logger was installed for.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Whether JSON output is active.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Build the env filter from `RUST_LOG`, falling back to the configured level.
pub fn build_env_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))
}

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<StructuredLogger, TelemetryError> {
    let env_filter = build_env_filter(config)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match config.format {
        LogFormat::Off => registry.try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(true),
            )
            .try_init(),
    };
    installed.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.full_service_name(),
        format = ?config.format,
        "Structured logging initialized"
    );

    Ok(StructuredLogger {
        service_name: config.full_service_name(),
        json: config.format == LogFormat::Json,
    })
}

/// Log a block-related event with standard fields.
#[macro_export]
macro_rules! log_block_event {
    ($level:ident, $subsystem:expr, $msg:expr, $block_number:expr, $block_hash:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            block_number = $block_number,
            block_hash = %$block_hash,
            $($($field)*,)?
            $msg
        )
    };
}
