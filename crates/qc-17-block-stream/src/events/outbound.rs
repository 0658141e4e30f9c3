//! Outbound events (produced)

use crate::domain::{ProofKind, Timestamp};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::Hash;

/// Summary of a block at close, before its proof exists
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedBlock {
    /// Block number
    pub number: u64,

    /// Block hash
    #[serde_as(as = "Bytes")]
    pub block_hash: Hash,

    /// Hash of the previous block
    #[serde_as(as = "Bytes")]
    pub previous_block_hash: Hash,

    /// Consensus time of the round that opened the block
    pub timestamp: Timestamp,

    /// Running hash of event transactions
    #[serde_as(as = "Bytes")]
    pub input_root: Hash,

    /// Running hash of transaction results
    #[serde_as(as = "Bytes")]
    pub output_root: Hash,

    /// Rounds the block spans
    pub rounds: u32,

    /// Items written, including header and boundary state changes
    pub item_count: u64,

    /// Closed by the freeze round
    pub frozen: bool,
}

/// A block whose proof was written
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedBlock {
    /// Block number
    pub number: u64,

    /// Direct or indirect
    pub kind: ProofKind,

    /// Sibling hashes in the proof
    pub sibling_count: usize,
}
