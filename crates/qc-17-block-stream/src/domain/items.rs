//! Block stream items.
//!
//! Every item written to a block is one variant of [`BlockItem`]. Items are
//! encoded with `bincode`; the item hash is SHA-384 of the encoded bytes.

use crate::domain::state::BlockStreamState;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{sha384_hash, Hash};
use std::time::{SystemTime, UNIX_EPOCH};

/// Consensus timestamp with nanosecond precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub seconds: i64,
    /// Nanoseconds within the second
    pub nanos: u32,
}

impl Timestamp {
    /// Create a timestamp.
    pub const fn new(seconds: i64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Wall-clock time, used by tooling that has no consensus clock.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: elapsed.as_secs() as i64,
            nanos: elapsed.subsec_nanos(),
        }
    }

    /// Timestamp `nanos` later, carrying into seconds.
    pub fn plus_nanos(&self, nanos: u64) -> Self {
        let total = u64::from(self.nanos) + nanos;
        Self {
            seconds: self.seconds + (total / 1_000_000_000) as i64,
            nanos: (total % 1_000_000_000) as u32,
        }
    }
}

/// Hash algorithm recorded in block headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    /// SHA-384, 48-byte digests
    Sha384,
}

/// First item of every block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block number
    pub number: u64,
    /// Consensus time of the round that opened the block
    pub first_round_consensus_time: Timestamp,
    /// Hash of the previous block (zero for a chain seeded at genesis)
    #[serde_as(as = "Bytes")]
    pub previous_block_hash: Hash,
    /// Node software version that produced the block
    pub software_version: String,
    /// Algorithm used for every hash in the block
    pub hash_algorithm: HashAlgorithm,
}

/// An application transaction as ordered by consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTransaction {
    /// Opaque transaction bytes
    pub application_transaction: Vec<u8>,
}

/// Outcome of a handled transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    /// Transaction applied
    Success,
    /// Transaction rejected during handling
    Failed,
}

/// Result of a handled transaction. Feeds the output hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    /// Handling outcome
    pub status: ResultStatus,
    /// Consensus time of the transaction
    pub consensus_timestamp: Timestamp,
    /// Fee charged, in the smallest unit
    pub transaction_fee_charged: u64,
}

/// Value carried by a state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateChangeValue {
    /// New block stream state written at a block boundary
    BlockStreamInfo(BlockStreamState),
    /// Opaque application state
    Raw(Vec<u8>),
}

/// A single named state update.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// Name of the state that changed
    pub state_name: String,
    /// New value
    pub value: StateChangeValue,
}

/// State updates applied at one consensus time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChanges {
    /// Consensus time the changes apply at
    pub consensus_timestamp: Timestamp,
    /// Individual changes
    pub state_changes: Vec<StateChange>,
}

/// Reference to a legacy record file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFileItem {
    /// Record file creation time
    pub creation_time: Timestamp,
    /// Record file bytes
    pub record_file_contents: Vec<u8>,
}

/// Finality proof, the last item of every block.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProof {
    /// Number of the proven block
    pub block: u64,
    /// Hash of the block before the proven one
    #[serde_as(as = "Bytes")]
    pub previous_block_root_hash: Hash,
    /// Ledger signature over the block hash, or over a later block's hash
    pub block_signature: Vec<u8>,
    /// Hashes folding this block's hash forward into the signed hash
    #[serde_as(as = "Vec<Bytes>")]
    pub sibling_hashes: Vec<Hash>,
}

/// Running hash an item feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Accumulator {
    /// Input root (event transactions)
    Input,
    /// Output root (transaction results)
    Output,
}

/// Every kind of item a block can contain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockItem {
    /// Block header
    BlockHeader(BlockHeader),
    /// Consensus-ordered transaction
    EventTransaction(EventTransaction),
    /// Transaction outcome
    TransactionResult(TransactionResult),
    /// State deltas
    StateChanges(StateChanges),
    /// Record file reference
    RecordFile(RecordFileItem),
    /// Finality proof
    BlockProof(BlockProof),
}

impl BlockItem {
    /// Human-readable item kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BlockHeader(_) => "BlockHeader",
            Self::EventTransaction(_) => "EventTransaction",
            Self::TransactionResult(_) => "TransactionResult",
            Self::StateChanges(_) => "StateChanges",
            Self::RecordFile(_) => "RecordFile",
            Self::BlockProof(_) => "BlockProof",
        }
    }

    /// Whether only the block stream itself may produce this item.
    pub fn is_stream_managed(&self) -> bool {
        match self {
            Self::BlockHeader(_) | Self::BlockProof(_) => true,
            Self::EventTransaction(_)
            | Self::TransactionResult(_)
            | Self::StateChanges(_)
            | Self::RecordFile(_) => false,
        }
    }

    /// Running hash this item contributes to, if any.
    pub fn accumulator(&self) -> Option<Accumulator> {
        match self {
            Self::EventTransaction(_) => Some(Accumulator::Input),
            Self::TransactionResult(_) => Some(Accumulator::Output),
            Self::BlockHeader(_)
            | Self::StateChanges(_)
            | Self::RecordFile(_)
            | Self::BlockProof(_) => None,
        }
    }

    /// Encode for the writer sink.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode bytes produced by [`BlockItem::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(bincode::deserialize(bytes)?)
    }

    /// SHA-384 of the encoded item.
    pub fn hash(&self) -> Result<Hash> {
        Ok(sha384_hash(&self.encode()?))
    }
}
