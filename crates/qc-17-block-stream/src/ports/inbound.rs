//! Inbound ports (driving side - API)

use crate::domain::BlockItem;
use crate::error::Result;
use crate::events::{ClosedBlock, ConsensusRound};
use shared_crypto::Hash;

/// Primary port: block assembly driven by consensus rounds
///
/// Single-threaded; the consensus handler owns the producer.
pub trait BlockStreamProducer {
    /// Begin a round, opening a block if none is open
    fn start_round(&mut self, round: &ConsensusRound) -> Result<()>;

    /// Append an item to the open block
    fn write_item(&mut self, item: BlockItem) -> Result<()>;

    /// End a round; returns the block if the round closed it
    fn end_round(&mut self, round: &ConsensusRound) -> Result<Option<ClosedBlock>>;

    /// Start the round, write its items and end it
    fn process_round(&mut self, round: ConsensusRound) -> Result<Option<ClosedBlock>>;
}

/// Query port: read-only view, safe alongside production
pub trait BlockStreamQueries: Send + Sync {
    /// Hash of block `number`; `None` outside the retained horizon
    fn hash_of(&self, number: u64) -> Option<Hash>;

    /// Pseudorandom seed from trailing output roots
    fn current_seed(&self) -> Option<Hash>;

    /// Open block number, else last closed block number
    fn current_block_number(&self) -> Option<u64>;

    /// Hash of the last closed block
    fn last_block_hash(&self) -> Option<Hash>;
}
