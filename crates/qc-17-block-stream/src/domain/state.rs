//! Persisted block stream state and startup input.

use crate::domain::hash_window::{BLOCK_HASH_WINDOW, OUTPUT_HASH_WINDOW};
use crate::domain::items::Timestamp;
use crate::error::{BlockStreamError, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::Hash;

/// State carried across blocks and restarts.
///
/// Mutated only when a block closes and when the stream is seeded.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockStreamState {
    /// Number of the most recently closed block
    pub block_number: Option<u64>,
    /// Consensus time of that block
    pub last_block_timestamp: Option<Timestamp>,
    /// Trailing output roots, oldest first
    #[serde_as(as = "Vec<Bytes>")]
    pub trailing_output_hashes: Vec<Hash>,
    /// Trailing block hashes, oldest first; the newest is the hash of `block_number`
    #[serde_as(as = "Vec<Bytes>")]
    pub trailing_block_hashes: Vec<Hash>,
}

impl BlockStreamState {
    /// Hash of the last closed block, when the state retains it.
    pub fn last_block_hash(&self) -> Option<Hash> {
        self.trailing_block_hashes.last().copied()
    }

    /// Number the next block will get.
    pub fn next_block_number(&self) -> u64 {
        self.block_number.map_or(0, |n| n + 1)
    }

    /// Reject states that contradict themselves.
    pub fn validate(&self) -> Result<()> {
        match self.block_number {
            None if !self.trailing_block_hashes.is_empty() => {
                Err(BlockStreamError::InconsistentState {
                    reason: format!(
                        "{} trailing block hashes but no closed block",
                        self.trailing_block_hashes.len()
                    ),
                })
            }
            Some(number) if self.trailing_block_hashes.len() as u64 > number + 1 => {
                Err(BlockStreamError::InconsistentState {
                    reason: format!(
                        "{} trailing block hashes for {} blocks",
                        self.trailing_block_hashes.len(),
                        number + 1
                    ),
                })
            }
            _ => Ok(()),
        }
    }

    /// Whether either trailing list exceeds its window.
    pub fn exceeds_windows(&self) -> bool {
        self.trailing_output_hashes.len() > OUTPUT_HASH_WINDOW
            || self.trailing_block_hashes.len() > BLOCK_HASH_WINDOW
    }
}

/// How the block hash chain is seeded at startup.
#[serde_as]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainSeed {
    /// Continue an existing chain from the hash of the last closed block
    Resume {
        /// Hash of the block numbered `BlockStreamState::block_number`
        #[serde_as(as = "Bytes")]
        last_block_hash: Hash,
    },
    /// Start a chain with the zero hash as prior; also used for recovery
    Genesis,
}

/// Immutable startup input for the block stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartupConfig {
    /// Persisted state to continue from
    pub state: BlockStreamState,
    /// Chain seed; `None` leaves the stream unable to open blocks
    pub seed: Option<ChainSeed>,
}

impl StartupConfig {
    /// Fresh chain starting at block 0.
    pub fn genesis() -> Self {
        Self {
            state: BlockStreamState::default(),
            seed: Some(ChainSeed::Genesis),
        }
    }

    /// Continue after `state` with an explicitly supplied last block hash.
    pub fn resume(state: BlockStreamState, last_block_hash: Hash) -> Self {
        Self {
            state,
            seed: Some(ChainSeed::Resume { last_block_hash }),
        }
    }

    /// State is known but the last block hash is not (yet).
    pub fn uninitialized(state: BlockStreamState) -> Self {
        Self { state, seed: None }
    }

    /// Seed from whatever the state store returned.
    ///
    /// Resumes from the newest trailing block hash if there is one, otherwise
    /// starts (or recovers) with the genesis seed.
    pub fn from_persisted(state: Option<BlockStreamState>) -> Self {
        match state {
            Some(state) => match state.last_block_hash() {
                Some(last_block_hash) => Self::resume(state, last_block_hash),
                None => Self {
                    state,
                    seed: Some(ChainSeed::Genesis),
                },
            },
            None => Self::genesis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_block_number() {
        assert_eq!(BlockStreamState::default().next_block_number(), 0);
        let state = BlockStreamState {
            block_number: Some(41),
            ..Default::default()
        };
        assert_eq!(state.next_block_number(), 42);
    }

    #[test]
    fn test_validate_rejects_hashes_without_blocks() {
        let state = BlockStreamState {
            trailing_block_hashes: vec![[1u8; 48]],
            ..Default::default()
        };
        assert!(matches!(
            state.validate(),
            Err(BlockStreamError::InconsistentState { .. })
        ));

        let state = BlockStreamState {
            block_number: Some(0),
            trailing_block_hashes: vec![[1u8; 48], [2u8; 48]],
            ..Default::default()
        };
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_from_persisted_resumes_from_newest_hash() {
        let state = BlockStreamState {
            block_number: Some(3),
            trailing_block_hashes: vec![[1u8; 48], [2u8; 48]],
            ..Default::default()
        };
        let startup = StartupConfig::from_persisted(Some(state.clone()));
        assert_eq!(
            startup.seed,
            Some(ChainSeed::Resume {
                last_block_hash: [2u8; 48]
            })
        );
        assert_eq!(startup.state, state);
    }

    #[test]
    fn test_from_persisted_without_chain_is_genesis() {
        assert_eq!(StartupConfig::from_persisted(None), StartupConfig::genesis());

        let state = BlockStreamState {
            block_number: Some(9),
            ..Default::default()
        };
        let startup = StartupConfig::from_persisted(Some(state));
        assert_eq!(startup.seed, Some(ChainSeed::Genesis));
    }

    #[test]
    fn test_state_json_shape() {
        let state = BlockStreamState {
            block_number: Some(1),
            last_block_timestamp: Some(Timestamp::new(5, 6)),
            trailing_output_hashes: vec![[9u8; 48]],
            trailing_block_hashes: vec![[8u8; 48]],
        };
        let json = serde_json::to_string(&state).unwrap();
        let back: BlockStreamState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
