//! Adapters for the outbound ports
//!
//! - [`file_writer`]: one length-prefixed file per block
//! - [`memory_writer`]: in-memory event log for tests and tooling
//! - [`state_store`]: JSON file and in-memory state persistence
//! - [`placeholder_signer`]: hash-as-signature ledger signer

pub mod file_writer;
pub mod memory_writer;
pub mod placeholder_signer;
pub mod state_store;

pub use file_writer::{read_block_file, FileBlockItemWriter, FileBlockItemWriterFactory};
pub use memory_writer::{InMemoryWriterFactory, WriterEvent, WriterFailure};
pub use placeholder_signer::{PlaceholderLedgerSigner, RecordingLedgerSigner};
pub use state_store::{InMemoryStateStore, JsonFileStateStore};
