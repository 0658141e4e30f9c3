//! Block Assembly State Machine
//!
//! Turns consensus rounds into chained blocks and hands closed blocks to the
//! [`PendingProofLedger`].
//!
//! ```text
//!              start_round                 end_round (rounds reached / freeze)
//! NoBlockOpen ─────────────► BlockOpen ───────────────────────────────────┐
//!      ▲                      │  ▲ write_item                             │
//!      │                      └──┘                                        │
//!      └──────────────────────── close: roots, hash, state, submit ◄──────┘
//!                                        │ freeze round      │ any failure
//!                                        ▼                   ▼
//!                                      Frozen              Halted
//! ```
//!
//! Production is single-threaded (`&mut self`). The hash chain and seed live
//! behind one `RwLock` shared with [`BlockStreamQuery`] handles.

use crate::{
    config::BlockStreamConfig,
    domain::{
        chain_steps, Accumulator, BlockHashChain, BlockHeader, BlockItem, BlockStreamState,
        HashAlgorithm, OutputHashAccumulator, PendingBlock, RunningHash, StartupConfig,
        StateChange, StateChangeValue, StateChanges, Timestamp,
    },
    error::{BlockStreamError, Result},
    events::{ClosedBlock, ConsensusRound},
    ledger::PendingProofLedger,
    metrics::Metrics,
    ports::{
        BlockItemWriter, BlockItemWriterFactory, BlockStreamProducer, BlockStreamQueries,
        BlockStreamStateStore,
    },
};
use parking_lot::RwLock;
use shared_crypto::{sha384_hash, short_hex, Hash};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// State name of the boundary state change written at every close.
pub const BLOCK_STREAM_INFO_STATE: &str = "BlockStreamService.BLOCK_STREAM_INFO";

/// Chain state readable while production runs.
struct ChainView {
    chain: BlockHashChain,
    outputs: OutputHashAccumulator,
    open_block: Option<u64>,
}

/// Cloneable read handle over the block stream.
#[derive(Clone)]
pub struct BlockStreamQuery {
    view: Arc<RwLock<ChainView>>,
}

impl BlockStreamQueries for BlockStreamQuery {
    fn hash_of(&self, number: u64) -> Option<Hash> {
        self.view.read().chain.hash_of(number)
    }

    fn current_seed(&self) -> Option<Hash> {
        self.view.read().outputs.current_seed()
    }

    fn current_block_number(&self) -> Option<u64> {
        let view = self.view.read();
        view.open_block.or(view.chain.last_number())
    }

    fn last_block_hash(&self) -> Option<Hash> {
        self.view.read().chain.last_block_hash()
    }
}

struct OpenBlock {
    number: u64,
    previous_block_hash: Hash,
    timestamp: Timestamp,
    rounds: u32,
    items: u64,
    input: RunningHash,
    writer: Box<dyn BlockItemWriter>,
}

enum AssemblyPhase {
    NoBlockOpen,
    BlockOpen(OpenBlock),
    Frozen { block_number: u64 },
    Halted { reason: String },
}

/// Block assembly driven by consensus rounds.
pub struct BlockStreamManager {
    config: BlockStreamConfig,
    writers: Arc<dyn BlockItemWriterFactory>,
    state_store: Arc<dyn BlockStreamStateStore>,
    ledger: Arc<PendingProofLedger>,
    view: Arc<RwLock<ChainView>>,
    phase: AssemblyPhase,
    last_block_timestamp: Option<Timestamp>,
    metrics: Arc<Metrics>,
}

impl BlockStreamManager {
    /// Create a manager seeded from `startup`.
    ///
    /// A `startup.seed` of `None` is accepted; `start_round` then fails with
    /// [`BlockStreamError::UninitializedChain`].
    pub fn new(
        config: BlockStreamConfig,
        startup: StartupConfig,
        writers: Arc<dyn BlockItemWriterFactory>,
        state_store: Arc<dyn BlockStreamStateStore>,
        ledger: Arc<PendingProofLedger>,
        metrics: Arc<Metrics>,
    ) -> Result<Self> {
        config.validate()?;
        let StartupConfig { state, seed } = startup;
        if state.exceeds_windows() {
            warn!(
                trailing_outputs = state.trailing_output_hashes.len(),
                trailing_blocks = state.trailing_block_hashes.len(),
                "Persisted hash history exceeds window size, trimming oldest entries"
            );
        }
        let chain = BlockHashChain::seeded(&state, seed)?;
        if !chain.is_initialized() {
            warn!("No last block hash supplied; blocks cannot open until the chain is seeded");
        }

        info!("[qc-17] Initializing Block Stream");
        info!("  Rounds per block: {}", config.rounds_per_block);
        info!("  Next block: {}", chain.next_number());
        info!("  Retained block hashes: {}", chain.retained());

        let outputs = OutputHashAccumulator::from_trailing(state.trailing_output_hashes);
        Ok(Self {
            config,
            writers,
            state_store,
            ledger,
            view: Arc::new(RwLock::new(ChainView {
                chain,
                outputs,
                open_block: None,
            })),
            phase: AssemblyPhase::NoBlockOpen,
            last_block_timestamp: state.last_block_timestamp,
            metrics,
        })
    }

    /// Read handle for `hash_of`, `current_seed` and block numbers.
    pub fn query(&self) -> BlockStreamQuery {
        BlockStreamQuery {
            view: Arc::clone(&self.view),
        }
    }

    /// Ledger receiving closed blocks.
    pub fn ledger(&self) -> &Arc<PendingProofLedger> {
        &self.ledger
    }

    /// Shared counters.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Active configuration.
    pub fn config(&self) -> &BlockStreamConfig {
        &self.config
    }

    /// Current state as it would be persisted.
    pub fn state(&self) -> BlockStreamState {
        let view = self.view.read();
        BlockStreamState {
            block_number: view.chain.last_number(),
            last_block_timestamp: self.last_block_timestamp,
            trailing_output_hashes: view.outputs.trailing(),
            trailing_block_hashes: view.chain.trailing(),
        }
    }

    /// Number of the open block, if any.
    pub fn open_block_number(&self) -> Option<u64> {
        match &self.phase {
            AssemblyPhase::BlockOpen(open) => Some(open.number),
            _ => None,
        }
    }

    /// Name of the current assembly phase, for logs and tests.
    pub fn phase_name(&self) -> &'static str {
        match self.phase {
            AssemblyPhase::NoBlockOpen => "NoBlockOpen",
            AssemblyPhase::BlockOpen(_) => "BlockOpen",
            AssemblyPhase::Frozen { .. } => "Frozen",
            AssemblyPhase::Halted { .. } => "Halted",
        }
    }

    /// Whether a freeze round closed the stream.
    pub fn is_frozen(&self) -> bool {
        matches!(self.phase, AssemblyPhase::Frozen { .. })
    }

    /// Whether a failure stopped production.
    pub fn is_halted(&self) -> bool {
        matches!(self.phase, AssemblyPhase::Halted { .. })
    }

    fn check_writable(&self) -> Result<()> {
        match &self.phase {
            AssemblyPhase::Frozen { block_number } => Err(BlockStreamError::Frozen {
                block_number: *block_number,
            }),
            AssemblyPhase::Halted { reason } => Err(BlockStreamError::Halted {
                reason: reason.clone(),
            }),
            AssemblyPhase::NoBlockOpen | AssemblyPhase::BlockOpen(_) => Ok(()),
        }
    }

    /// Stop production after a failure; the error is handed back.
    fn halt(&mut self, err: BlockStreamError) -> BlockStreamError {
        error!(
            error = %err,
            block_number = ?self.view.read().open_block,
            "Block stream halted"
        );
        self.view.write().open_block = None;
        self.phase = AssemblyPhase::Halted {
            reason: err.to_string(),
        };
        err
    }

    fn open_block(&self, round: &ConsensusRound) -> Result<OpenBlock> {
        let (number, previous_block_hash) = {
            let view = self.view.read();
            let prior = view
                .chain
                .prior_hash()
                .ok_or(BlockStreamError::UninitializedChain)?;
            (view.chain.next_number(), prior)
        };

        let mut writer = self
            .writers
            .create()
            .map_err(|e| BlockStreamError::writer(number, e))?;
        writer
            .open_block(number)
            .map_err(|e| BlockStreamError::writer(number, e))?;

        let mut open = OpenBlock {
            number,
            previous_block_hash,
            timestamp: round.consensus_timestamp,
            rounds: 0,
            items: 0,
            input: RunningHash::new(),
            writer,
        };
        let header = BlockItem::BlockHeader(BlockHeader {
            number,
            first_round_consensus_time: round.consensus_timestamp,
            previous_block_hash,
            software_version: self.config.software_version.clone(),
            hash_algorithm: HashAlgorithm::Sha384,
        });
        append_item(&self.view, &self.metrics, &mut open, &header)?;

        {
            let mut view = self.view.write();
            view.outputs.reset_block();
            view.open_block = Some(number);
        }
        self.metrics.record_block_opened();
        info!(
            block_number = number,
            round = round.round_number,
            previous_block_hash = %short_hex(&previous_block_hash),
            "Opened block"
        );
        Ok(open)
    }

    fn close_block(&self, mut open: OpenBlock, round: &ConsensusRound) -> Result<ClosedBlock> {
        let number = open.number;
        let input_root = open.input.finalize_reset();

        // Work on copies; queries see the block only once it is durable.
        let (mut chain, mut outputs) = {
            let view = self.view.read();
            (view.chain.clone(), view.outputs.clone())
        };
        let output_root = outputs.finalize_block();
        let steps = chain_steps(input_root, output_root);
        let block_hash = chain.next_hash(&steps)?;
        chain.append(number, block_hash)?;
        let state = BlockStreamState {
            block_number: Some(number),
            last_block_timestamp: Some(open.timestamp),
            trailing_output_hashes: outputs.trailing(),
            trailing_block_hashes: chain.trailing(),
        };

        let boundary = BlockItem::StateChanges(StateChanges {
            consensus_timestamp: round.consensus_timestamp,
            state_changes: vec![StateChange {
                state_name: BLOCK_STREAM_INFO_STATE.to_string(),
                value: StateChangeValue::BlockStreamInfo(state.clone()),
            }],
        });
        append_item(&self.view, &self.metrics, &mut open, &boundary)?;
        self.state_store.save(&state)?;

        {
            let mut view = self.view.write();
            view.chain = chain;
            view.outputs = outputs;
            view.open_block = None;
        }

        let closed = ClosedBlock {
            number,
            block_hash,
            previous_block_hash: open.previous_block_hash,
            timestamp: open.timestamp,
            input_root,
            output_root,
            rounds: open.rounds,
            item_count: open.items,
            frozen: round.freeze_boundary,
        };
        self.ledger.submit(PendingBlock {
            number,
            block_hash,
            previous_block_hash: open.previous_block_hash,
            chain_steps: steps,
            writer: open.writer,
        })?;

        self.metrics.record_block_closed();
        info!(
            block_number = number,
            block_hash = %short_hex(&block_hash),
            rounds = closed.rounds,
            items = closed.item_count,
            freeze = closed.frozen,
            "Closed block"
        );
        Ok(closed)
    }
}

/// Write one item to the open block and feed its running hash.
fn append_item(
    view: &RwLock<ChainView>,
    metrics: &Metrics,
    open: &mut OpenBlock,
    item: &BlockItem,
) -> Result<()> {
    let bytes = item.encode()?;
    open.writer
        .write_item(&bytes)
        .map_err(|e| BlockStreamError::writer(open.number, e))?;

    let item_hash = sha384_hash(&bytes);
    match item.accumulator() {
        Some(Accumulator::Input) => open.input.add(&item_hash),
        Some(Accumulator::Output) => view.write().outputs.add_result(&item_hash),
        None => {}
    }
    open.items += 1;
    metrics.record_item_written();
    debug!(
        block_number = open.number,
        kind = item.kind(),
        item_hash = %short_hex(&item_hash),
        "Wrote item"
    );
    Ok(())
}

impl BlockStreamProducer for BlockStreamManager {
    fn start_round(&mut self, round: &ConsensusRound) -> Result<()> {
        self.check_writable()?;
        if let AssemblyPhase::BlockOpen(open) = &self.phase {
            debug!(
                block_number = open.number,
                round = round.round_number,
                "Round continues open block"
            );
            return Ok(());
        }
        if !self.view.read().chain.is_initialized() {
            return Err(BlockStreamError::UninitializedChain);
        }
        match self.open_block(round) {
            Ok(open) => {
                self.phase = AssemblyPhase::BlockOpen(open);
                Ok(())
            }
            Err(e) => Err(self.halt(e)),
        }
    }

    fn write_item(&mut self, item: BlockItem) -> Result<()> {
        self.check_writable()?;
        if item.is_stream_managed() {
            return Err(BlockStreamError::InvalidItem { kind: item.kind() });
        }
        let AssemblyPhase::BlockOpen(open) = &mut self.phase else {
            return Err(BlockStreamError::NoBlockOpen);
        };
        if let Err(e) = append_item(&self.view, &self.metrics, open, &item) {
            return Err(self.halt(e));
        }
        Ok(())
    }

    fn end_round(&mut self, round: &ConsensusRound) -> Result<Option<ClosedBlock>> {
        self.check_writable()?;
        let AssemblyPhase::BlockOpen(open) = &mut self.phase else {
            return Err(BlockStreamError::NoBlockOpen);
        };
        open.rounds += 1;
        if open.rounds < self.config.rounds_per_block && !round.freeze_boundary {
            debug!(
                block_number = open.number,
                rounds = open.rounds,
                "Round ended, block stays open"
            );
            return Ok(None);
        }

        let open = match std::mem::replace(&mut self.phase, AssemblyPhase::NoBlockOpen) {
            AssemblyPhase::BlockOpen(open) => open,
            other => {
                self.phase = other;
                return Err(BlockStreamError::NoBlockOpen);
            }
        };
        match self.close_block(open, round) {
            Ok(closed) => {
                self.last_block_timestamp = Some(closed.timestamp);
                if closed.frozen {
                    info!(block_number = closed.number, "Freeze round reached, block stream frozen");
                    self.phase = AssemblyPhase::Frozen {
                        block_number: closed.number,
                    };
                }
                Ok(Some(closed))
            }
            Err(e) => Err(self.halt(e)),
        }
    }

    fn process_round(&mut self, mut round: ConsensusRound) -> Result<Option<ClosedBlock>> {
        self.start_round(&round)?;
        for item in std::mem::take(&mut round.items) {
            self.write_item(item)?;
        }
        self.end_round(&round)
    }
}
