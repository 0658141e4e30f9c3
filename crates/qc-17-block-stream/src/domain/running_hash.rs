//! Per-block running hashes and the output root history.
//!
//! ```text
//! block k:   acc = ZERO ─combine(item₁)─► ... ─combine(itemₙ)─► root_k
//!                                                                │
//!            window [root_{k-3}, root_{k-2}, root_{k-1}, root_k] ◄┘
//!                      │ evicted on push
//!                      ▼
//!                   seed
//! ```

use crate::domain::hash_window::{HashWindow, OUTPUT_HASH_WINDOW};
use shared_crypto::{combine, Hash, ZERO_HASH};

/// Running hash folded over one block's items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunningHash {
    value: Hash,
    count: u64,
}

impl Default for RunningHash {
    fn default() -> Self {
        Self {
            value: ZERO_HASH,
            count: 0,
        }
    }
}

impl RunningHash {
    /// Running hash starting at `ZERO_HASH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one item hash into the running value.
    pub fn add(&mut self, item_hash: &Hash) {
        self.value = combine(&self.value, item_hash);
        self.count += 1;
    }

    /// Current value.
    pub fn value(&self) -> Hash {
        self.value
    }

    /// Items folded since the last reset.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Return the final value and start over from zero.
    pub fn finalize_reset(&mut self) -> Hash {
        let value = self.value;
        *self = Self::default();
        value
    }
}

/// Output root accumulator with a four-entry history and seed.
#[derive(Clone, Debug)]
pub struct OutputHashAccumulator {
    running: RunningHash,
    window: HashWindow,
    seed: Option<Hash>,
}

impl Default for OutputHashAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputHashAccumulator {
    /// Accumulator with no history.
    pub fn new() -> Self {
        Self::from_trailing(Vec::new())
    }

    /// Restore from persisted trailing output roots (oldest first).
    ///
    /// No seed is exposed until the next eviction.
    pub fn from_trailing(trailing: Vec<Hash>) -> Self {
        Self {
            running: RunningHash::new(),
            window: HashWindow::from_entries(OUTPUT_HASH_WINDOW, trailing),
            seed: None,
        }
    }

    /// Fold a transaction result's hash into the current block.
    pub fn add_result(&mut self, item_hash: &Hash) {
        self.running.add(item_hash);
    }

    /// Discard any partial value; called when a block opens.
    pub fn reset_block(&mut self) {
        self.running = RunningHash::new();
    }

    /// Close the block: push the output root, update the seed on eviction.
    pub fn finalize_block(&mut self) -> Hash {
        let root = self.running.finalize_reset();
        if let Some(evicted) = self.window.push(root) {
            self.seed = Some(evicted);
        }
        root
    }

    /// Output root of the block closed four closures ago, once one exists.
    pub fn current_seed(&self) -> Option<Hash> {
        self.seed
    }

    /// Results folded into the open block so far.
    pub fn results_in_block(&self) -> u64 {
        self.running.count()
    }

    /// Trailing output roots, oldest first.
    pub fn trailing(&self) -> Vec<Hash> {
        self.window.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_crypto::sha384_hash;

    #[test]
    fn test_running_hash_fold() {
        let a = sha384_hash(b"a");
        let b = sha384_hash(b"b");
        let mut running = RunningHash::new();
        running.add(&a);
        running.add(&b);
        assert_eq!(running.value(), combine(&combine(&ZERO_HASH, &a), &b));
        assert_eq!(running.count(), 2);

        running.finalize_reset();
        assert_eq!(running.value(), ZERO_HASH);
        assert_eq!(running.count(), 0);
    }

    #[test]
    fn test_empty_block_root_is_zero() {
        let mut acc = OutputHashAccumulator::new();
        assert_eq!(acc.finalize_block(), ZERO_HASH);
    }

    #[test]
    fn test_seed_lags_four_closures() {
        let mut acc = OutputHashAccumulator::new();
        let mut roots = Vec::new();
        for i in 0u8..6 {
            acc.add_result(&sha384_hash(&[i]));
            roots.push(acc.finalize_block());
            if i < 4 {
                assert_eq!(acc.current_seed(), None);
            } else {
                assert_eq!(acc.current_seed(), Some(roots[i as usize - 4]));
            }
        }
    }

    #[test]
    fn test_seed_unchanged_by_items() {
        let mut acc = OutputHashAccumulator::from_trailing(vec![[1u8; 48]; 4]);
        acc.finalize_block();
        let seed = acc.current_seed();
        assert_eq!(seed, Some([1u8; 48]));

        acc.add_result(&sha384_hash(b"x"));
        assert_eq!(acc.current_seed(), seed);
        assert_eq!(acc.results_in_block(), 1);
    }

    #[test]
    fn test_restored_window_has_no_seed() {
        let acc = OutputHashAccumulator::from_trailing(vec![[7u8; 48]; 4]);
        assert_eq!(acc.current_seed(), None);
        assert_eq!(acc.trailing().len(), 4);
    }
}
