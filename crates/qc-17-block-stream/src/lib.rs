//! # Quantum Chain - Block Stream (Subsystem 17)
//!
//! **Bounded Context:** Block Assembly & Finality Proofs
//! **Architecture Compliance:** DDD + Hexagonal + EDA + TDD
//!
//! ## Purpose
//!
//! Assembles consensus-ordered items into numbered, hash-chained blocks and
//! drives every block to exactly one finality proof signed by the ledger-wide
//! signing service:
//! - Per-block input and output running hashes
//! - A 256-entry block hash chain answering `hash_of(n)`
//! - A pseudorandom seed from the four trailing output roots
//! - Direct or indirect proofs for out-of-order signatures
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - File / in-memory block writers                   │
//! │  - JSON / in-memory state stores                    │
//! │  - Placeholder ledger signer                        │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: BlockStreamProducer, BlockStreamQueries │
//! │  - Outbound: BlockItemWriter, LedgerSigner, ...     │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - HashWindow, RunningHash, OutputHashAccumulator   │
//! │  - BlockHashChain                                   │
//! │  - PendingRun, proofs                               │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Chain**: `hash(n) = combine(combine(hash(n-1), input_root), output_root)`
//! 2. **Horizon**: at most 256 block hashes retained; older numbers answer `None`
//! 3. **Seed lag**: the seed is the output root evicted from the 4-entry window
//! 4. **Exactly once**: every closed block gets one proof, direct or indirect
//! 5. **Contiguity**: pending blocks ascend without gaps and drain as a prefix
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! let metrics = Arc::new(Metrics::new());
//! let ledger = Arc::new(PendingProofLedger::new(signer, metrics.clone()));
//! let _listener = spawn_signature_listener(ledger.clone(), bus.subscribe());
//! let mut manager = BlockStreamManager::new(
//!     BlockStreamConfig::from_env()?,
//!     StartupConfig::from_persisted(store.load()?),
//!     writers,
//!     store,
//!     ledger,
//!     metrics,
//! )?;
//! manager.process_round(round)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Writer, state store and signer adapters
pub mod adapters;
/// Domain models and pure logic
pub mod domain;
/// Event type definitions
pub mod events;
/// Event handlers
pub mod handler;
/// Pending-proof ledger
pub mod ledger;
pub mod ports;
pub mod service;

mod config;
mod error;
mod metrics;

pub use config::BlockStreamConfig;
pub use error::{BlockStreamError, Result};
pub use metrics::Metrics;

pub use domain::{
    BlockHashChain, BlockItem, BlockStreamState, ChainSeed, HashWindow, OutputHashAccumulator,
    ProofKind, StartupConfig, Timestamp,
};

pub use ports::{
    BlockItemWriter, BlockItemWriterFactory, BlockStreamProducer, BlockStreamQueries,
    BlockStreamStateStore, LedgerSigner,
};

pub use events::{ClosedBlock, ConsensusRound, FinalizedBlock};

pub use handler::spawn_signature_listener;
pub use ledger::PendingProofLedger;
pub use service::{BlockStreamManager, BlockStreamQuery};

/// Subsystem identifier
pub const SUBSYSTEM_ID: u8 = 17;

/// Default consensus rounds per block
pub const DEFAULT_ROUNDS_PER_BLOCK: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_id() {
        assert_eq!(SUBSYSTEM_ID, 17);
    }

    #[test]
    fn test_window_constants() {
        assert_eq!(domain::OUTPUT_HASH_WINDOW, 4);
        assert_eq!(domain::BLOCK_HASH_WINDOW, 256);
    }
}
