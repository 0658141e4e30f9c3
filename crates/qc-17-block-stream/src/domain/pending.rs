//! Run of closed blocks awaiting a ledger signature.
//!
//! ## Invariants
//!
//! 1. **Contiguous**: block numbers ascend with no gaps.
//! 2. **Prefix removal**: a signature drains every block up to and including
//!    the signed one; nothing is removed from the middle.
//! 3. **Exactly once**: a drained block is gone; a later signature over its
//!    own hash matches nothing.
//!
//! Generic over the writer type so the run stays free of I/O.

use shared_crypto::Hash;
use std::collections::VecDeque;

use crate::error::{BlockStreamError, Result};

/// A closed block whose proof has not been written yet.
pub struct PendingBlock<W> {
    /// Block number
    pub number: u64,
    /// Hash of this block
    pub block_hash: Hash,
    /// Hash of the block before it
    pub previous_block_hash: Hash,
    /// Hashes that fold `previous_block_hash` into `block_hash`
    pub chain_steps: Vec<Hash>,
    /// Live writer, still open until the proof lands
    pub writer: W,
}

impl<W> std::fmt::Debug for PendingBlock<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingBlock")
            .field("number", &self.number)
            .field("block_hash", &hex::encode(&self.block_hash[..8]))
            .field("chain_steps", &self.chain_steps.len())
            .finish_non_exhaustive()
    }
}

/// A drained block paired with the siblings its proof needs.
#[derive(Debug)]
pub struct ResolvedBlock<W> {
    /// The drained block
    pub block: PendingBlock<W>,
    /// Empty for the signed block itself
    pub sibling_hashes: Vec<Hash>,
}

impl<W> ResolvedBlock<W> {
    /// Whether the signature was over this block's own hash.
    pub fn is_direct(&self) -> bool {
        self.sibling_hashes.is_empty()
    }
}

/// Ascending, gap-free run of pending blocks.
pub struct PendingRun<W> {
    entries: VecDeque<PendingBlock<W>>,
}

impl<W> Default for PendingRun<W> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<W> PendingRun<W> {
    /// Empty run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail. The number must follow the current tail.
    pub fn push(&mut self, block: PendingBlock<W>) -> Result<()> {
        if let Some(tail) = self.entries.back() {
            let expected = tail.number + 1;
            if block.number != expected {
                return Err(BlockStreamError::NonContiguousBlock {
                    expected,
                    actual: block.number,
                });
            }
        }
        self.entries.push_back(block);
        Ok(())
    }

    /// Drain every block up to the one whose hash is `signed_hash`.
    ///
    /// Returns the drained blocks oldest first; empty if nothing matches.
    pub fn resolve(&mut self, signed_hash: &Hash) -> Vec<ResolvedBlock<W>> {
        let Some(matched) = self
            .entries
            .iter()
            .position(|entry| &entry.block_hash == signed_hash)
        else {
            return Vec::new();
        };

        let drained: Vec<PendingBlock<W>> = self.entries.drain(..=matched).collect();

        // Siblings of entry i are the chain steps of entries i+1..=matched,
        // built back to front.
        let mut siblings: Vec<Vec<Hash>> = Vec::with_capacity(drained.len());
        let mut tail: Vec<Hash> = Vec::new();
        for block in drained.iter().rev() {
            siblings.push(tail.clone());
            let mut next = block.chain_steps.clone();
            next.extend_from_slice(&tail);
            tail = next;
        }
        siblings.reverse();

        drained
            .into_iter()
            .zip(siblings)
            .map(|(block, sibling_hashes)| ResolvedBlock {
                block,
                sibling_hashes,
            })
            .collect()
    }

    /// Pending block count.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing awaits a proof.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of the oldest unproven block.
    pub fn oldest_number(&self) -> Option<u64> {
        self.entries.front().map(|e| e.number)
    }

    /// Numbers of all pending blocks, ascending.
    pub fn numbers(&self) -> Vec<u64> {
        self.entries.iter().map(|e| e.number).collect()
    }

    /// Whether a block with this hash is pending.
    pub fn contains(&self, block_hash: &Hash) -> bool {
        self.entries.iter().any(|e| &e.block_hash == block_hash)
    }
}
