//! Domain layer - pure block stream logic
//!
//! Everything here is synchronous and free of I/O.
//!
//! ## Types
//!
//! - [`BlockItem`]: closed set of items a block can contain
//! - [`HashWindow`]: bounded FIFO of hashes
//! - [`OutputHashAccumulator`]: per-block output root plus the seed history
//! - [`BlockHashChain`]: chained block hashes with a 256-entry horizon
//! - [`PendingRun`]: contiguous run of blocks awaiting proofs
//! - [`StartupConfig`]: immutable startup input

pub mod block_hash_chain;
pub mod hash_window;
pub mod items;
pub mod pending;
pub mod proof;
pub mod running_hash;
pub mod state;

pub use block_hash_chain::{chain_steps, BlockHashChain};
pub use hash_window::{HashWindow, BLOCK_HASH_WINDOW, OUTPUT_HASH_WINDOW};
pub use items::{
    Accumulator, BlockHeader, BlockItem, BlockProof, EventTransaction, HashAlgorithm,
    RecordFileItem, ResultStatus, StateChange, StateChangeValue, StateChanges, Timestamp,
    TransactionResult,
};
pub use pending::{PendingBlock, PendingRun, ResolvedBlock};
pub use proof::{build_proof, verify_siblings, ProofKind};
pub use running_hash::{OutputHashAccumulator, RunningHash};
pub use state::{BlockStreamState, ChainSeed, StartupConfig};
