//! # Shared Bus - Ledger Signature Bus
//!
//! Message-passing boundary between the ledger signing service and its
//! consumers (the block stream's pending-proof ledger, tooling, tests).
//!
//! ```text
//! ┌────────────────┐                      ┌──────────────────────┐
//! │ Ledger Signer  │                      │ Pending-Proof Ledger │
//! │                │    publish()         │  (listener task)     │
//! │                │ ──────┐              │                      │
//! └────────────────┘       │              └──────────────────────┘
//!                          ▼                        ↑
//!                   ┌──────────────┐                │
//!                   │ Signature Bus│ ───────────────┘
//!                   └──────────────┘   subscribe() / register_consumer()
//! ```
//!
//! Consumers never mutate block stream state from the signer's context; they
//! receive events over a channel and apply them at their own serialization
//! point.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::LedgerSignatureEvent;
pub use publisher::{EventPublisher, LedgerSignatureBus};
pub use subscriber::{ConsumerRegistration, Subscription, SubscriptionError};

/// Current protocol version for bus messages.
pub const PROTOCOL_VERSION: u16 = 1;

/// Per-subscriber backlog that triggers a warning.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_version() {
        assert_eq!(PROTOCOL_VERSION, 1);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
