//! Node wiring.
//!
//! ```text
//! SyntheticConsensus ──rounds──► BlockStreamManager ──closed blocks──► PendingProofLedger
//!                                   │         │                              │   ▲
//!                         block files    state.json          request_signature   │ on_signature
//!                                                                    ▼           │
//!                                               PlaceholderLedgerSigner ──► LedgerSignatureBus
//! ```

use crate::config::NodeConfig;
use crate::simulation::SyntheticConsensus;
use anyhow::{bail, Context, Result};
use qc_17_block_stream::adapters::{
    FileBlockItemWriterFactory, JsonFileStateStore, PlaceholderLedgerSigner,
};
use qc_17_block_stream::{
    spawn_signature_listener, BlockStreamManager, BlockStreamProducer, BlockStreamQueries,
    BlockStreamStateStore, Metrics, PendingProofLedger, StartupConfig, Timestamp,
};
use shared_bus::LedgerSignatureBus;
use shared_crypto::hash_hex;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Rounds fed to the block stream.
    pub rounds: u64,
    /// Blocks closed during the run.
    pub blocks_closed: u64,
    /// Last closed block number.
    pub last_block_number: Option<u64>,
    /// Hex hash of the last closed block.
    pub last_block_hash: Option<String>,
    /// Blocks still waiting for a proof.
    pub unproven: usize,
    /// Whether the freeze round was reached.
    pub frozen: bool,
}

/// The block stream node.
pub struct NodeRuntime {
    config: NodeConfig,
    manager: BlockStreamManager,
    ledger: Arc<PendingProofLedger>,
    metrics: Arc<Metrics>,
    listener: JoinHandle<()>,
}

impl NodeRuntime {
    /// Wire all collaborators. Must run inside a Tokio runtime.
    pub fn start(config: NodeConfig) -> Result<Self> {
        info!("===========================================");
        info!("  Quantum-Chain Block Stream Node");
        info!("  Software version: {}", config.block_stream.software_version);
        info!("===========================================");

        let bus = Arc::new(LedgerSignatureBus::with_capacity(
            config.block_stream.signature_channel_capacity,
        ));
        let signer = PlaceholderLedgerSigner::on_current_runtime(Arc::clone(&bus))
            .context("Node runtime must start inside a Tokio runtime")?;
        let metrics = Arc::new(Metrics::new());
        let ledger = Arc::new(PendingProofLedger::new(Arc::new(signer), metrics.clone()));
        let listener = spawn_signature_listener(Arc::clone(&ledger), bus.subscribe());

        let store = Arc::new(JsonFileStateStore::new(&config.block_stream.state_path));
        let persisted = store
            .load()
            .context("Failed to load block stream state")?;
        let startup = StartupConfig::from_persisted(persisted);
        let writers = Arc::new(
            FileBlockItemWriterFactory::new(&config.block_stream.block_dir)
                .context("Failed to create block directory")?,
        );

        let manager = BlockStreamManager::new(
            config.block_stream.clone(),
            startup,
            writers,
            store,
            Arc::clone(&ledger),
            metrics.clone(),
        )
        .context("Failed to initialize block stream")?;

        info!("Block dir: {:?}", config.block_stream.block_dir);
        info!("State path: {:?}", config.block_stream.state_path);

        Ok(Self {
            config,
            manager,
            ledger,
            metrics,
            listener,
        })
    }

    /// Feed the synthetic rounds, then wait up to `drain_timeout` for proofs.
    pub async fn run(&mut self, drain_timeout: Duration) -> Result<RunSummary> {
        let feed = SyntheticConsensus::new(self.config.simulation.clone(), Timestamp::now());
        let mut rounds = 0;
        for round in feed {
            let round_number = round.round_number;
            self.manager
                .process_round(round)
                .with_context(|| format!("Block stream failed at round {round_number}"))?;
            rounds += 1;
            if self.manager.is_frozen() {
                info!(round = round_number, "Freeze reached, stopping feed");
                break;
            }
            // Let the signer and listener tasks interleave with production
            tokio::task::yield_now().await;
        }

        self.drain(drain_timeout).await;

        let query = self.manager.query();
        let summary = RunSummary {
            rounds,
            blocks_closed: self.metrics.blocks_closed.load(Ordering::Relaxed),
            last_block_number: query.current_block_number(),
            last_block_hash: query.last_block_hash().map(|h| hash_hex(&h)),
            unproven: self.ledger.pending_count(),
            frozen: self.manager.is_frozen(),
        };
        info!(
            rounds = summary.rounds,
            blocks = summary.blocks_closed,
            unproven = summary.unproven,
            "Run complete"
        );
        if summary.unproven > 0 {
            warn!(
                oldest = ?self.ledger.oldest_pending(),
                "Blocks still waiting for ledger signatures"
            );
        }
        Ok(summary)
    }

    async fn drain(&self, timeout: Duration) {
        let waited = tokio::time::timeout(timeout, async {
            while self.ledger.pending_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        if waited.is_err() {
            warn!(pending = self.ledger.pending_count(), "Timed out waiting for proofs");
        }
    }

    /// Stop the listener. Fails if the stream halted.
    ///
    /// The listener keeps the bus alive through the ledger's signer, so it
    /// is aborted rather than waited on.
    pub async fn shutdown(self) -> Result<()> {
        let halted = self.manager.is_halted();
        self.listener.abort();
        let _ = self.listener.await;
        if halted {
            bail!("Block stream halted during the run");
        }
        info!("Node stopped");
        Ok(())
    }
}
