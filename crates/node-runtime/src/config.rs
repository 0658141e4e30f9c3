//! # Node Configuration
//!
//! Groups the block stream, telemetry and simulation settings. Every value
//! has a default and an environment override.

use anyhow::{Context, Result};
use qc_17_block_stream::BlockStreamConfig;
use quantum_telemetry::TelemetryConfig;
use std::env;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Block stream configuration.
    pub block_stream: BlockStreamConfig,
    /// Logging configuration.
    pub telemetry: TelemetryConfig,
    /// Synthetic consensus feed.
    pub simulation: SimulationConfig,
}

impl NodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            block_stream: BlockStreamConfig::from_env()
                .context("Invalid block stream configuration")?,
            telemetry: TelemetryConfig::for_subsystem("17", "block-stream")
                .context("Invalid logging configuration")?,
            simulation: SimulationConfig::from_env()?,
        })
    }
}

/// Synthetic consensus feed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Rounds to produce before stopping.
    pub rounds: u64,
    /// Transactions per round (each yields an event and a result).
    pub transactions_per_round: usize,
    /// Round that carries the freeze boundary, if any.
    pub freeze_round: Option<u64>,
    /// Seed for the transaction generator; random when absent.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            transactions_per_round: 4,
            freeze_round: None,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load from `QC_SIM_ROUNDS`, `QC_SIM_TXS_PER_ROUND`, `QC_SIM_FREEZE_ROUND`
    /// and `QC_SIM_SEED`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            rounds: parse_var("QC_SIM_ROUNDS")?.unwrap_or(defaults.rounds),
            transactions_per_round: parse_var("QC_SIM_TXS_PER_ROUND")?
                .unwrap_or(defaults.transactions_per_round),
            freeze_round: parse_var("QC_SIM_FREEZE_ROUND")?,
            rng_seed: parse_var("QC_SIM_SEED")?,
        })
    }
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid value for {key}: {raw}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulation_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.rounds, 20);
        assert_eq!(config.freeze_round, None);
    }
}
