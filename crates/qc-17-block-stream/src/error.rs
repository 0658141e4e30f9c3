//! Error types for the block stream subsystem

use thiserror::Error;

/// Result type alias for block stream operations
pub type Result<T> = std::result::Result<T, BlockStreamError>;

/// Errors that can occur while assembling, chaining or proving blocks
#[derive(Debug, Error)]
pub enum BlockStreamError {
    /// Production requested before the last block hash was supplied
    #[error("Block hash chain not initialized: no last block hash or genesis seed supplied")]
    UninitializedChain,

    /// An item or round end arrived while no block was open
    #[error("No block is open")]
    NoBlockOpen,

    /// The stream closed its freeze block and accepts no more rounds
    #[error("Block stream frozen after block {block_number}")]
    Frozen {
        /// Last block closed before the freeze
        block_number: u64,
    },

    /// A previous fatal failure stopped production
    #[error("Block stream halted: {reason}")]
    Halted {
        /// Failure that halted the stream
        reason: String,
    },

    /// The writer sink failed for a block
    #[error("Writer failed for block {block_number}: {reason}")]
    Writer {
        /// Block being written
        block_number: u64,
        /// Underlying failure
        reason: String,
    },

    /// The state store failed to load or save
    #[error("State store error: {0}")]
    StateStore(String),

    /// Item or state encoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Caller supplied an item kind only the stream may produce
    #[error("Invalid item: {kind} items are produced by the block stream")]
    InvalidItem {
        /// Rejected item kind
        kind: &'static str,
    },

    /// Block submitted out of sequence
    #[error("Non-contiguous block: expected {expected}, got {actual}")]
    NonContiguousBlock {
        /// Next number the receiver accepts
        expected: u64,
        /// Number that was offered
        actual: u64,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Startup or persisted state contradicts itself
    #[error("Inconsistent state: {reason}")]
    InconsistentState {
        /// Reason for inconsistency
        reason: String,
    },
}

impl BlockStreamError {
    /// Check if error is fatal (production must stop)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Writer { .. }
                | Self::StateStore(_)
                | Self::Serialization(_)
                | Self::NonContiguousBlock { .. }
                | Self::InconsistentState { .. }
                | Self::Halted { .. }
        )
    }

    /// Build a writer error for a block.
    pub fn writer(block_number: u64, reason: impl std::fmt::Display) -> Self {
        Self::Writer {
            block_number,
            reason: reason.to_string(),
        }
    }
}

impl From<bincode::Error> for BlockStreamError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
