//! # SHA-384 Hashing
//!
//! Digest primitives for the block stream hash chains.
//!
//! ## Chain Combine
//!
//! Both rolling chains (per-block output root and the block hash chain) are
//! built from one operation: `combine(a, b) = SHA-384(a || b)`. A left fold of
//! `combine` over a list of sibling hashes is what a proof verifier replays.

use crate::CryptoError;
use sha2::{Digest, Sha384};

/// Length of a SHA-384 digest in bytes.
pub const HASH_LEN: usize = 48;

/// SHA-384 hash output (384-bit).
pub type Hash = [u8; HASH_LEN];

/// All-zero sentinel used as the initial running hash and the genesis prior.
pub const ZERO_HASH: Hash = [0u8; HASH_LEN];

/// Stateful SHA-384 hasher.
pub struct Sha384Hasher {
    inner: Sha384,
}

impl Sha384Hasher {
    /// Create new hasher.
    pub fn new() -> Self {
        Self {
            inner: Sha384::new(),
        }
    }

    /// Update with data.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.inner.update(data);
        self
    }

    /// Finalize and return hash, resetting the hasher for reuse.
    pub fn finalize_reset(&mut self) -> Hash {
        let digest = self.inner.finalize_reset();
        let mut output = [0u8; HASH_LEN];
        output.copy_from_slice(&digest);
        output
    }
}

impl Default for Sha384Hasher {
    fn default() -> Self {
        Self::new()
    }
}

/// Hash data with SHA-384 (one-shot).
pub fn sha384_hash(data: &[u8]) -> Hash {
    let digest = Sha384::digest(data);
    let mut output = [0u8; HASH_LEN];
    output.copy_from_slice(&digest);
    output
}

/// Digest of the concatenation `a || b`.
pub fn combine(a: &Hash, b: &Hash) -> Hash {
    let mut hasher = Sha384::new();
    hasher.update(a);
    hasher.update(b);
    let mut output = [0u8; HASH_LEN];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Left fold of [`combine`] starting at `start`.
///
/// `fold_hashes(h, [s1, s2])` is `combine(combine(h, s1), s2)`.
pub fn fold_hashes<'a, I>(start: &Hash, siblings: I) -> Hash
where
    I: IntoIterator<Item = &'a Hash>,
{
    siblings
        .into_iter()
        .fold(*start, |acc, sibling| combine(&acc, sibling))
}

/// Copy a byte slice into a [`Hash`], checking its length.
pub fn hash_from_slice(bytes: &[u8]) -> Result<Hash, CryptoError> {
    if bytes.len() != HASH_LEN {
        return Err(CryptoError::InvalidHashLength {
            expected: HASH_LEN,
            actual: bytes.len(),
        });
    }
    let mut output = [0u8; HASH_LEN];
    output.copy_from_slice(bytes);
    Ok(output)
}

/// Lowercase hex rendering, used in log fields.
pub fn hash_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// First eight bytes in hex, for compact log lines.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha384_hash_length() {
        let hash = sha384_hash(b"Hello, World!");
        assert_eq!(hash.len(), 48);
        assert_ne!(hash, ZERO_HASH);
    }

    #[test]
    fn test_known_vector() {
        // SHA-384("abc"), FIPS 180-2 appendix D
        let expected = "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed\
                        8086072ba1e7cc2358baeca134c825a7";
        assert_eq!(hash_hex(&sha384_hash(b"abc")), expected);
    }

    #[test]
    fn test_combine_is_hash_of_concatenation() {
        let a = sha384_hash(b"a");
        let b = sha384_hash(b"b");
        let mut concat = Vec::with_capacity(96);
        concat.extend_from_slice(&a);
        concat.extend_from_slice(&b);
        assert_eq!(combine(&a, &b), sha384_hash(&concat));
    }

    #[test]
    fn test_combine_is_order_sensitive() {
        let a = sha384_hash(b"a");
        let b = sha384_hash(b"b");
        assert_ne!(combine(&a, &b), combine(&b, &a));
    }

    #[test]
    fn test_fold_hashes() {
        let start = sha384_hash(b"start");
        let s1 = sha384_hash(b"s1");
        let s2 = sha384_hash(b"s2");
        assert_eq!(
            fold_hashes(&start, &[s1, s2]),
            combine(&combine(&start, &s1), &s2)
        );
        assert_eq!(fold_hashes(&start, &[]), start);
    }

    #[test]
    fn test_streaming() {
        let oneshot = sha384_hash(b"hello world");

        let mut hasher = Sha384Hasher::new();
        hasher.update(b"hello ").update(b"world");
        assert_eq!(hasher.finalize_reset(), oneshot);

        // Reset state hashes the empty message
        assert_eq!(hasher.finalize_reset(), sha384_hash(b""));
    }

    #[test]
    fn test_hash_from_slice() {
        let hash = sha384_hash(b"x");
        assert_eq!(hash_from_slice(&hash).unwrap(), hash);
        assert!(matches!(
            hash_from_slice(&hash[..32]),
            Err(CryptoError::InvalidHashLength {
                expected: 48,
                actual: 32
            })
        ));
    }

    #[test]
    fn test_short_hex() {
        assert_eq!(short_hex(&[0xAB; 48]), "abababababababab");
    }
}
