//! # Pending-Proof Ledger
//!
//! Shared boundary between block assembly (which submits closed blocks) and
//! the signature listener (which delivers ledger signatures).
//!
//! ```text
//!  submit(N) ──► [ N-2 | N-1 | N ] ──► request_signature(hash N)
//!                   ▲
//!  on_signature(hash N-1):
//!     N-2  indirect proof, siblings = steps(N-1)
//!     N-1  direct proof
//!     ──► [ N ]
//! ```
//!
//! The run is drained under the lock; proofs are written to the drained
//! blocks' writers after the lock is released.

use crate::domain::{build_proof, PendingBlock, PendingRun, ProofKind, ResolvedBlock};
use crate::error::{BlockStreamError, Result};
use crate::events::FinalizedBlock;
use crate::metrics::Metrics;
use crate::ports::{BlockItemWriter, LedgerSigner};
use parking_lot::Mutex;
use shared_crypto::{short_hex, Hash};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Pending block holding its live writer.
pub type PendingWriterBlock = PendingBlock<Box<dyn BlockItemWriter>>;

/// Blocks awaiting proofs, plus the signer that is asked for them.
pub struct PendingProofLedger {
    run: Mutex<PendingRun<Box<dyn BlockItemWriter>>>,
    signer: Arc<dyn LedgerSigner>,
    metrics: Arc<Metrics>,
}

impl PendingProofLedger {
    /// Empty ledger requesting signatures from `signer`.
    pub fn new(signer: Arc<dyn LedgerSigner>, metrics: Arc<Metrics>) -> Self {
        Self {
            run: Mutex::new(PendingRun::new()),
            signer,
            metrics,
        }
    }

    /// Append a closed block and request a signature over its hash.
    pub fn submit(&self, block: PendingWriterBlock) -> Result<()> {
        let number = block.number;
        let block_hash = block.block_hash;
        self.run.lock().push(block)?;

        self.metrics.record_signature_request();
        debug!(
            block_number = number,
            block_hash = %short_hex(&block_hash),
            "Requesting ledger signature"
        );
        self.signer.request_signature(block_hash);
        Ok(())
    }

    /// Apply a signature; write proofs for every block it finalizes.
    ///
    /// Unknown hashes are ignored. Drained blocks are removed even if a
    /// writer fails; every proof is attempted and the first failure returned.
    pub fn on_signature(&self, signed_hash: &Hash, signature: &[u8]) -> Result<Vec<FinalizedBlock>> {
        let resolved = self.run.lock().resolve(signed_hash);
        if resolved.is_empty() {
            self.metrics.record_ignored_signature();
            debug!(
                message_hash = %short_hex(signed_hash),
                "Signature matches no pending block"
            );
            return Ok(Vec::new());
        }

        let mut finalized = Vec::with_capacity(resolved.len());
        let mut first_error = None;
        for block in resolved {
            let summary = FinalizedBlock {
                number: block.block.number,
                kind: if block.is_direct() {
                    ProofKind::Direct
                } else {
                    ProofKind::Indirect
                },
                sibling_count: block.sibling_hashes.len(),
            };
            match write_proof(block, signature) {
                Ok(()) => {
                    self.metrics
                        .record_proof(summary.kind == ProofKind::Direct);
                    info!(
                        block_number = summary.number,
                        kind = ?summary.kind,
                        siblings = summary.sibling_count,
                        "Block proof written"
                    );
                    finalized.push(summary);
                }
                Err(e) => {
                    error!(block_number = summary.number, error = %e, "Failed to write block proof");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(finalized),
        }
    }

    /// Blocks still waiting.
    pub fn pending_count(&self) -> usize {
        self.run.lock().len()
    }

    /// Oldest unproven block.
    pub fn oldest_pending(&self) -> Option<u64> {
        self.run.lock().oldest_number()
    }

    /// Pending block numbers, ascending.
    pub fn pending_numbers(&self) -> Vec<u64> {
        self.run.lock().numbers()
    }

    /// Whether a block with this hash awaits a proof.
    pub fn is_pending(&self, block_hash: &Hash) -> bool {
        self.run.lock().contains(block_hash)
    }
}

fn write_proof(resolved: ResolvedBlock<Box<dyn BlockItemWriter>>, signature: &[u8]) -> Result<()> {
    let number = resolved.block.number;
    let bytes = build_proof(&resolved, signature).encode()?;
    let mut writer = resolved.block.writer;
    writer
        .write_item(&bytes)
        .map_err(|e| BlockStreamError::writer(number, e))?;
    writer
        .close_block()
        .map_err(|e| BlockStreamError::writer(number, e))
}
