//! # Quantum-Chain Block Stream Node
//!
//! Entry point: initializes logging, loads configuration from the environment
//! and runs the block stream against a synthetic consensus feed.
//!
//! ## Startup Sequence
//!
//! 1. Initialize structured logging
//! 2. Load configuration (env)
//! 3. Load persisted block stream state, seed the chain
//! 4. Start the signature listener
//! 5. Feed rounds until done or frozen, then wait for proofs

use std::time::Duration;

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use quantum_telemetry::init_telemetry;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env()?;
    let _telemetry =
        init_telemetry(config.telemetry.clone()).context("Failed to initialize logging")?;

    let mut runtime = NodeRuntime::start(config)?;
    let summary = runtime.run(Duration::from_secs(10)).await?;
    info!(
        last_block = ?summary.last_block_number,
        last_hash = ?summary.last_block_hash,
        frozen = summary.frozen,
        "Block stream summary"
    );

    runtime.shutdown().await
}
