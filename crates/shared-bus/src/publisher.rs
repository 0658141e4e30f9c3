//! # Signature Publisher
//!
//! Defines the publishing side of the signature bus.

use crate::events::LedgerSignatureEvent;
use crate::subscriber::{ConsumerRegistration, Registry, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for publishing signature events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// # Returns
    ///
    /// The number of active subscribers that received the event.
    async fn publish(&self, event: LedgerSignatureEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// In-memory signature bus.
///
/// Every subscription owns an unbounded queue and the bus fans each event out
/// to all of them, so a subscriber registered when an event is published
/// receives it exactly once, however far behind it is. A backlog above
/// `capacity` is logged but never dropped.
pub struct LedgerSignatureBus {
    /// Live subscriptions. Subscriptions only hold a weak handle, so dropping
    /// the bus closes every queue.
    registry: Arc<Mutex<Registry>>,

    /// Total events published.
    events_published: AtomicU64,

    /// Backlog size that triggers a warning.
    capacity: usize,
}

impl LedgerSignatureBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus with specified backlog warning threshold.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to every signature published from now on.
    ///
    /// Dropping the returned `Subscription` unregisters it.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let subscription = Subscription::register(&self.registry);
        debug!(
            registrations = self.subscriber_count(),
            "New signature subscription created"
        );
        subscription
    }

    /// Register a callback invoked once per published signature.
    ///
    /// The callback runs on a tokio task fed by its own subscription; it must
    /// be called from within a tokio runtime.
    pub fn register_consumer<F>(&self, consumer: F) -> ConsumerRegistration
    where
        F: Fn(LedgerSignatureEvent) + Send + Sync + 'static,
    {
        ConsumerRegistration::spawn(self.subscribe(), consumer)
    }

    /// Get the number of live registrations.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().len()
    }

    /// Get the backlog warning threshold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Publish without awaiting; usable from synchronous contexts.
    pub fn publish_now(&self, event: LedgerSignatureEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let hash = event.short_hash();

        let (delivered, max_backlog) = self.registry.lock().fan_out(&event);
        if delivered == 0 {
            warn!(message_hash = %hash, "Signature dropped (no receivers)");
            return 0;
        }
        if max_backlog == self.capacity + 1 {
            warn!(
                backlog = max_backlog,
                capacity = self.capacity,
                "Signature subscriber falling behind"
            );
        }
        debug!(
            message_hash = %hash,
            receivers = delivered,
            "Signature published"
        );
        delivered
    }
}

impl Default for LedgerSignatureBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for LedgerSignatureBus {
    async fn publish(&self, event: LedgerSignatureEvent) -> usize {
        self.publish_now(event)
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
