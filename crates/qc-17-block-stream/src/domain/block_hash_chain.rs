//! Block hash chain with a 256-entry history.
//!
//! Each block hash folds the prior block hash forward through the block's
//! chain steps, input root first and output root last:
//!
//! ```text
//! hash(n) = combine(combine(hash(n-1), input_root(n)), output_root(n))
//! ```
//!
//! The same steps are the sibling hashes of an indirect proof, so a proof for
//! block `n` signed at block `m` carries two siblings per block in `n+1..=m`.

use crate::domain::hash_window::{HashWindow, BLOCK_HASH_WINDOW};
use crate::domain::state::{BlockStreamState, ChainSeed};
use crate::error::{BlockStreamError, Result};
use shared_crypto::{fold_hashes, Hash, ZERO_HASH};

/// Chain steps for one block: `[input_root, output_root]`.
pub fn chain_steps(input_root: Hash, output_root: Hash) -> Vec<Hash> {
    vec![input_root, output_root]
}

/// Rolling chain of block hashes.
#[derive(Clone, Debug)]
pub struct BlockHashChain {
    window: HashWindow,
    prior: Option<Hash>,
    last_number: Option<u64>,
}

impl Default for BlockHashChain {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockHashChain {
    /// Chain that has not been seeded; it cannot produce hashes.
    pub fn new() -> Self {
        Self {
            window: HashWindow::new(BLOCK_HASH_WINDOW),
            prior: None,
            last_number: None,
        }
    }

    /// Build the chain from persisted state and an optional seed.
    pub fn seeded(state: &BlockStreamState, seed: Option<ChainSeed>) -> Result<Self> {
        state.validate()?;
        let mut chain = Self {
            window: HashWindow::from_entries(
                BLOCK_HASH_WINDOW,
                state.trailing_block_hashes.iter().copied(),
            ),
            prior: None,
            last_number: state.block_number,
        };
        match seed {
            None => {}
            Some(ChainSeed::Resume { last_block_hash }) => {
                if chain.last_number.is_some()
                    && chain.window.newest() != Some(&last_block_hash)
                {
                    chain.window.push(last_block_hash);
                }
                chain.prior = Some(last_block_hash);
            }
            Some(ChainSeed::Genesis) => {
                // No chain exists: nothing retained is a real block hash
                chain.window.clear();
                chain.prior = Some(ZERO_HASH);
            }
        }
        Ok(chain)
    }

    /// Whether a prior hash is known.
    pub fn is_initialized(&self) -> bool {
        self.prior.is_some()
    }

    /// Hash the next block builds on.
    pub fn prior_hash(&self) -> Option<Hash> {
        self.prior
    }

    /// Number of the last closed block.
    pub fn last_number(&self) -> Option<u64> {
        self.last_number
    }

    /// Number the next appended block must have.
    pub fn next_number(&self) -> u64 {
        self.last_number.map_or(0, |n| n + 1)
    }

    /// Hash of the last closed block, if retained.
    pub fn last_block_hash(&self) -> Option<Hash> {
        self.last_number.and_then(|n| self.hash_of(n))
    }

    /// Compute the next block hash from its chain steps, without appending.
    pub fn next_hash(&self, steps: &[Hash]) -> Result<Hash> {
        let prior = self.prior.ok_or(BlockStreamError::UninitializedChain)?;
        Ok(fold_hashes(&prior, steps))
    }

    /// Record the hash of block `number`, which must be the next number.
    ///
    /// Returns the hash evicted from the window, if any.
    pub fn append(&mut self, number: u64, hash: Hash) -> Result<Option<Hash>> {
        if !self.is_initialized() {
            return Err(BlockStreamError::UninitializedChain);
        }
        let expected = self.next_number();
        if number != expected {
            return Err(BlockStreamError::NonContiguousBlock {
                expected,
                actual: number,
            });
        }
        self.prior = Some(hash);
        self.last_number = Some(number);
        Ok(self.window.push(hash))
    }

    /// Hash of block `number`; `None` outside the retained horizon.
    pub fn hash_of(&self, number: u64) -> Option<Hash> {
        let last = self.last_number?;
        if number > last {
            return None;
        }
        let back = usize::try_from(last - number).ok()?;
        if back >= self.window.len() {
            return None;
        }
        self.window.get(self.window.len() - 1 - back).copied()
    }

    /// Oldest block number still answerable by `hash_of`.
    pub fn oldest_retained(&self) -> Option<u64> {
        let last = self.last_number?;
        if self.window.is_empty() {
            return None;
        }
        Some(last + 1 - self.window.len() as u64)
    }

    /// Trailing block hashes, oldest first.
    pub fn trailing(&self) -> Vec<Hash> {
        self.window.to_vec()
    }

    /// Number of hashes currently retained.
    pub fn retained(&self) -> usize {
        self.window.len()
    }
}
