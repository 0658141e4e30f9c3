//! Metrics collection for the block stream

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the assembly state machine and the proof ledger
#[derive(Debug, Default)]
pub struct Metrics {
    /// Blocks opened
    pub blocks_opened: AtomicU64,

    /// Blocks closed and handed to the ledger
    pub blocks_closed: AtomicU64,

    /// Items written, including header and boundary items
    pub items_written: AtomicU64,

    /// Signature requests sent
    pub signature_requests: AtomicU64,

    /// Proofs over the block's own hash
    pub direct_proofs: AtomicU64,

    /// Proofs through sibling hashes
    pub indirect_proofs: AtomicU64,

    /// Signatures that matched no pending block
    pub ignored_signatures: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a block opened.
    pub fn record_block_opened(&self) {
        self.blocks_opened.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a block closed.
    pub fn record_block_closed(&self) {
        self.blocks_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Count an item written to a block.
    pub fn record_item_written(&self) {
        self.items_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a signature request.
    pub fn record_signature_request(&self) {
        self.signature_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a written proof
    pub fn record_proof(&self, direct: bool) {
        if direct {
            self.direct_proofs.fetch_add(1, Ordering::Relaxed);
        } else {
            self.indirect_proofs.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count a signature that matched no pending block.
    pub fn record_ignored_signature(&self) {
        self.ignored_signatures.fetch_add(1, Ordering::Relaxed);
    }

    /// Blocks closed but not yet proven
    pub fn get_unproven_blocks(&self) -> u64 {
        let closed = self.blocks_closed.load(Ordering::Relaxed);
        let proven = self.direct_proofs.load(Ordering::Relaxed)
            + self.indirect_proofs.load(Ordering::Relaxed);
        closed.saturating_sub(proven)
    }

    /// Average items per closed block
    pub fn get_avg_items_per_block(&self) -> f64 {
        let blocks = self.blocks_closed.load(Ordering::Relaxed);
        if blocks == 0 {
            return 0.0;
        }
        self.items_written.load(Ordering::Relaxed) as f64 / blocks as f64
    }
}
