//! Block proof construction and verification.

use crate::domain::items::{BlockItem, BlockProof};
use crate::domain::pending::ResolvedBlock;
use serde::{Deserialize, Serialize};
use shared_crypto::{fold_hashes, Hash};

/// How a block's finality was established.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofKind {
    /// Signature over the block's own hash
    Direct,
    /// Signature over a later block plus sibling hashes
    Indirect,
}

/// Build the proof item for a drained block.
pub fn build_proof<W>(resolved: &ResolvedBlock<W>, signature: &[u8]) -> BlockItem {
    BlockItem::BlockProof(BlockProof {
        block: resolved.block.number,
        previous_block_root_hash: resolved.block.previous_block_hash,
        block_signature: signature.to_vec(),
        sibling_hashes: resolved.sibling_hashes.clone(),
    })
}

/// Fold `block_hash` through `siblings` and compare with `signed_hash`.
pub fn verify_siblings(block_hash: &Hash, siblings: &[Hash], signed_hash: &Hash) -> bool {
    &fold_hashes(block_hash, siblings) == signed_hash
}

impl BlockProof {
    /// Direct or indirect, from the sibling count.
    pub fn kind(&self) -> ProofKind {
        if self.sibling_hashes.is_empty() {
            ProofKind::Direct
        } else {
            ProofKind::Indirect
        }
    }

    /// Hash the signature covers, given this block's own hash.
    pub fn signed_hash(&self, block_hash: &Hash) -> Hash {
        fold_hashes(block_hash, &self.sibling_hashes)
    }
}
