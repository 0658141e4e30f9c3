//! Inbound events (consumed)

use crate::domain::{BlockItem, Timestamp};

/// A consensus round as delivered by the consensus handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConsensusRound {
    /// Round number, strictly increasing
    pub round_number: u64,

    /// Consensus time of the round
    pub consensus_timestamp: Timestamp,

    /// Whether the network freezes after this round
    pub freeze_boundary: bool,

    /// Items produced by handling the round, in order
    pub items: Vec<BlockItem>,
}

impl ConsensusRound {
    /// Round without items.
    pub fn new(round_number: u64, consensus_timestamp: Timestamp) -> Self {
        Self {
            round_number,
            consensus_timestamp,
            freeze_boundary: false,
            items: Vec::new(),
        }
    }

    /// Mark this round as the freeze round.
    pub fn with_freeze(mut self) -> Self {
        self.freeze_boundary = true;
        self
    }

    /// Attach items.
    pub fn with_items(mut self, items: Vec<BlockItem>) -> Self {
        self.items = items;
        self
    }
}
