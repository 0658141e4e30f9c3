//! Signature listener task.
//!
//! Single consumer of a signature bus subscription. Signatures are applied to
//! the ledger one at a time, in bus order.

use crate::ledger::PendingProofLedger;
use shared_bus::Subscription;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Spawn the listener on the current runtime.
///
/// The task ends when the bus is dropped.
pub fn spawn_signature_listener(
    ledger: Arc<PendingProofLedger>,
    mut subscription: Subscription,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Signature listener started");
        while let Some(event) = subscription.recv().await {
            if let Err(e) = ledger.on_signature(&event.message_hash, &event.signature) {
                error!(
                    message_hash = %event.short_hash(),
                    error = %e,
                    "Failed to apply ledger signature"
                );
            }
        }
        info!("Signature bus closed, listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryWriterFactory, RecordingLedgerSigner};
    use crate::domain::{chain_steps, PendingBlock};
    use crate::metrics::Metrics;
    use crate::ports::BlockItemWriterFactory;
    use shared_bus::{EventPublisher, LedgerSignatureBus, LedgerSignatureEvent};
    use shared_crypto::{fold_hashes, sha384_hash, ZERO_HASH};
    use std::time::Duration;

    #[tokio::test]
    async fn test_listener_applies_signatures() {
        let bus = LedgerSignatureBus::new();
        let ledger = Arc::new(PendingProofLedger::new(
            Arc::new(RecordingLedgerSigner::new()),
            Arc::new(Metrics::new()),
        ));
        let writers = InMemoryWriterFactory::new();
        let mut writer = writers.create().unwrap();
        writer.open_block(0).unwrap();
        ledger
            .submit(PendingBlock {
                number: 0,
                block_hash: [1u8; 48],
                previous_block_hash: [0u8; 48],
                chain_steps: vec![],
                writer,
            })
            .unwrap();

        let handle = spawn_signature_listener(ledger.clone(), bus.subscribe());
        bus.publish(LedgerSignatureEvent::new([1u8; 48], vec![0xff; 48]))
            .await;

        tokio::time::timeout(Duration::from_secs(1), async {
            while ledger.pending_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("block finalized");
        assert!(writers.is_closed(0));

        drop(bus);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("listener stops")
            .unwrap();
    }

    #[tokio::test]
    async fn test_backlog_larger_than_capacity_proves_every_block() {
        let bus = LedgerSignatureBus::with_capacity(1);
        let ledger = Arc::new(PendingProofLedger::new(
            Arc::new(RecordingLedgerSigner::new()),
            Arc::new(Metrics::new()),
        ));
        let writers = InMemoryWriterFactory::new();
        let mut prior = ZERO_HASH;
        let mut hashes = Vec::new();
        for n in 0..4u64 {
            let mut writer = writers.create().unwrap();
            writer.open_block(n).unwrap();
            let steps = chain_steps(sha384_hash(&n.to_le_bytes()), ZERO_HASH);
            let hash = fold_hashes(&prior, &steps);
            ledger
                .submit(PendingBlock {
                    number: n,
                    block_hash: hash,
                    previous_block_hash: prior,
                    chain_steps: steps,
                    writer,
                })
                .unwrap();
            hashes.push(hash);
            prior = hash;
        }

        // Queue every signature, newest block's first, before the listener runs
        let subscription = bus.subscribe();
        for hash in [hashes[1], hashes[0], hashes[3], hashes[2]] {
            bus.publish(LedgerSignatureEvent::new(hash, vec![0xee; 48])).await;
        }
        assert_eq!(subscription.backlog(), 4);

        let handle = spawn_signature_listener(ledger.clone(), subscription);
        tokio::time::timeout(Duration::from_secs(1), async {
            while ledger.pending_count() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("every block finalized");
        assert_eq!(writers.closed_blocks(), vec![0, 1, 2, 3]);

        drop(bus);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("listener stops")
            .unwrap();
    }
}
