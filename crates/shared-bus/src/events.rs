//! # Ledger Signature Events
//!
//! The only traffic on this bus: a resolved `(message hash, signature)` pair
//! published by the ledger signing service.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::{short_hex, Hash};

/// A ledger-wide signature over a message hash.
///
/// The signing service publishes one event per resolved request; the block
/// stream treats `message_hash` as the block hash being finalized.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSignatureEvent {
    /// The hash that was signed.
    #[serde_as(as = "Bytes")]
    pub message_hash: Hash,
    /// Opaque signature bytes.
    pub signature: Vec<u8>,
}

impl LedgerSignatureEvent {
    /// Create a new signature event.
    #[must_use]
    pub fn new(message_hash: Hash, signature: Vec<u8>) -> Self {
        Self {
            message_hash,
            signature,
        }
    }

    /// Compact hash prefix for log fields.
    #[must_use]
    pub fn short_hash(&self) -> String {
        short_hex(&self.message_hash)
    }
}
