//! Outbound ports (driven side - SPI)

use crate::domain::BlockStreamState;
use crate::error::Result;
use shared_crypto::Hash;
use std::io;

/// Port: per-block sink for encoded items
///
/// One writer per block. Calls arrive in order: `open_block`, any number of
/// `write_item`, then `close_block` once the proof is written.
pub trait BlockItemWriter: Send {
    /// Start block `number`
    fn open_block(&mut self, number: u64) -> io::Result<()>;

    /// Append one encoded item
    fn write_item(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Finish the block; no further calls follow
    fn close_block(&mut self) -> io::Result<()>;
}

/// Port: creates a fresh writer for each block
pub trait BlockItemWriterFactory: Send + Sync {
    /// Create an unopened writer
    fn create(&self) -> io::Result<Box<dyn BlockItemWriter>>;
}

/// Port: ledger-wide signing service
///
/// Requests are fire-and-forget. The signature comes back later, possibly out
/// of order, on the signature bus.
pub trait LedgerSigner: Send + Sync {
    /// Ask for a signature over `message_hash`
    fn request_signature(&self, message_hash: Hash);
}

/// Port: durable storage for the block stream state
pub trait BlockStreamStateStore: Send + Sync {
    /// Last saved state, if any
    fn load(&self) -> Result<Option<BlockStreamState>>;

    /// Replace the saved state
    fn save(&self, state: &BlockStreamState) -> Result<()>;
}
