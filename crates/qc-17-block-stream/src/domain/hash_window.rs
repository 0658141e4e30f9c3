//! Bounded FIFO of hashes.
//!
//! Pure domain type (no I/O). Oldest entry first; pushing past capacity
//! evicts and returns the oldest.

use shared_crypto::Hash;
use std::collections::VecDeque;

/// Trailing output roots kept for the pseudorandom seed.
pub const OUTPUT_HASH_WINDOW: usize = 4;

/// Trailing block hashes kept for `hash_of` queries.
pub const BLOCK_HASH_WINDOW: usize = 256;

/// Fixed-capacity window of hashes, oldest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashWindow {
    entries: VecDeque<Hash>,
    capacity: usize,
}

impl HashWindow {
    /// Create an empty window. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Restore a window from persisted entries (oldest first).
    ///
    /// Entries beyond capacity are dropped from the old end.
    pub fn from_entries(capacity: usize, entries: impl IntoIterator<Item = Hash>) -> Self {
        let mut window = Self::new(capacity);
        for hash in entries {
            window.push(hash);
        }
        window
    }

    /// Append `newest`, returning the evicted oldest entry when full.
    pub fn push(&mut self, newest: Hash) -> Option<Hash> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(newest);
        evicted
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the window holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the next push evicts.
    pub fn is_full(&self) -> bool {
        self.entries.len() == self.capacity
    }

    /// Most recently pushed entry.
    pub fn newest(&self) -> Option<&Hash> {
        self.entries.back()
    }

    /// Entry that will be evicted next.
    pub fn oldest(&self) -> Option<&Hash> {
        self.entries.front()
    }

    /// Entry at `index`, counting from the oldest.
    pub fn get(&self, index: usize) -> Option<&Hash> {
        self.entries.get(index)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Hash> {
        self.entries.iter()
    }

    /// Entries oldest first, for persistence.
    pub fn to_vec(&self) -> Vec<Hash> {
        self.entries.iter().copied().collect()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn h(byte: u8) -> Hash {
        [byte; 48]
    }

    #[test]
    fn test_push_evicts_oldest_when_full() {
        let mut window = HashWindow::new(OUTPUT_HASH_WINDOW);
        for i in 1..=4 {
            assert_eq!(window.push(h(i)), None);
        }
        assert!(window.is_full());
        assert_eq!(window.push(h(5)), Some(h(1)));
        assert_eq!(window.to_vec(), vec![h(2), h(3), h(4), h(5)]);
        assert_eq!(window.newest(), Some(&h(5)));
        assert_eq!(window.oldest(), Some(&h(2)));
    }

    #[test]
    fn test_from_entries_trims_old_end() {
        let window = HashWindow::from_entries(2, vec![h(1), h(2), h(3)]);
        assert_eq!(window.to_vec(), vec![h(2), h(3)]);
    }

    #[test]
    fn test_zero_capacity_raised() {
        let mut window = HashWindow::new(0);
        assert_eq!(window.capacity(), 1);
        window.push(h(1));
        assert_eq!(window.push(h(2)), Some(h(1)));
    }

    proptest! {
        #[test]
        fn prop_window_never_exceeds_capacity(
            capacity in 1usize..16,
            pushes in proptest::collection::vec(any::<u8>(), 0..64),
        ) {
            let mut window = HashWindow::new(capacity);
            for (i, byte) in pushes.iter().enumerate() {
                let evicted = window.push(h(*byte));
                prop_assert!(window.len() <= capacity);
                prop_assert_eq!(evicted.is_some(), i >= capacity);
            }
        }
    }
}
