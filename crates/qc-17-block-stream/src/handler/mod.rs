//! Event handlers
//!
//! - SignatureListener: feeds ledger signatures from the bus into the
//!   pending-proof ledger

pub mod signature_listener;

pub use signature_listener::spawn_signature_listener;
