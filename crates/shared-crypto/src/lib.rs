//! # Shared Crypto - Hash Primitives
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-384 | Item hashes, running hashes, block hash chain |
//!
//! Signature *production* lives outside this crate; the block stream only
//! requests and consumes ledger signatures.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod hashing;

// Re-exports
pub use errors::CryptoError;
pub use hashing::{
    combine, fold_hashes, hash_from_slice, hash_hex, sha384_hash, short_hex, Hash, Sha384Hasher,
    HASH_LEN, ZERO_HASH,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
