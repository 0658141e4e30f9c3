//! Ledger signers for local runs and tests.
//!
//! [`PlaceholderLedgerSigner`] stands in for the threshold signing service:
//! the "signature" is SHA-384 of the message hash, published asynchronously
//! on the signature bus like a real signature would be.

use crate::ports::LedgerSigner;
use parking_lot::Mutex;
use shared_bus::{EventPublisher, LedgerSignatureBus, LedgerSignatureEvent};
use shared_crypto::{sha384_hash, short_hex, Hash};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Signs by hashing and publishes on the bus from a runtime task.
pub struct PlaceholderLedgerSigner {
    bus: Arc<LedgerSignatureBus>,
    runtime: Handle,
}

impl PlaceholderLedgerSigner {
    /// Signer publishing on `bus`, spawning onto `runtime`.
    pub fn new(bus: Arc<LedgerSignatureBus>, runtime: Handle) -> Self {
        Self { bus, runtime }
    }

    /// Signer bound to the runtime of the calling task.
    ///
    /// Returns `None` outside a Tokio runtime.
    pub fn on_current_runtime(bus: Arc<LedgerSignatureBus>) -> Option<Self> {
        Handle::try_current().ok().map(|runtime| Self::new(bus, runtime))
    }

    /// Placeholder signature over `message_hash`.
    pub fn sign(message_hash: &Hash) -> Vec<u8> {
        sha384_hash(message_hash).to_vec()
    }
}

impl LedgerSigner for PlaceholderLedgerSigner {
    fn request_signature(&self, message_hash: Hash) {
        let bus = Arc::clone(&self.bus);
        self.runtime.spawn(async move {
            let signature = Self::sign(&message_hash);
            let receivers = bus
                .publish(LedgerSignatureEvent::new(message_hash, signature))
                .await;
            debug!(
                message_hash = %short_hex(&message_hash),
                receivers,
                "Published placeholder signature"
            );
        });
    }
}

/// Records requests without answering them; the caller delivers signatures.
#[derive(Default)]
pub struct RecordingLedgerSigner {
    requests: Mutex<Vec<Hash>>,
}

impl RecordingLedgerSigner {
    /// Signer with no requests recorded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes requested so far, in request order.
    pub fn requests(&self) -> Vec<Hash> {
        self.requests.lock().clone()
    }
}

impl LedgerSigner for RecordingLedgerSigner {
    fn request_signature(&self, message_hash: Hash) {
        self.requests.lock().push(message_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_placeholder_publishes_hash_signature() {
        let bus = Arc::new(LedgerSignatureBus::new());
        let mut sub = bus.subscribe();
        let signer = PlaceholderLedgerSigner::on_current_runtime(Arc::clone(&bus)).unwrap();

        signer.request_signature([5u8; 48]);

        let event = timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("timeout")
            .expect("event");
        assert_eq!(event.message_hash, [5u8; 48]);
        assert_eq!(event.signature, sha384_hash(&[5u8; 48]).to_vec());
        assert_eq!(event.signature.len(), 48);
    }

    #[test]
    fn test_recording_signer() {
        let signer = RecordingLedgerSigner::new();
        signer.request_signature([1u8; 48]);
        signer.request_signature([2u8; 48]);
        assert_eq!(signer.requests(), vec![[1u8; 48], [2u8; 48]]);
    }

    #[test]
    fn test_no_runtime() {
        let bus = Arc::new(LedgerSignatureBus::new());
        assert!(PlaceholderLedgerSigner::on_current_runtime(bus).is_none());
    }
}
