//! # Signature Subscriber
//!
//! Defines the subscription side of the signature bus: pull-style
//! `Subscription`s and push-style `ConsumerRegistration`s.

use crate::events::LedgerSignatureEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The bus was closed.
    #[error("Signature bus closed")]
    Closed,
}

struct Entry {
    id: u64,
    sender: mpsc::UnboundedSender<LedgerSignatureEvent>,
    backlog: Arc<AtomicUsize>,
}

/// Senders of every live subscription, owned by the bus.
#[derive(Default)]
pub(crate) struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

impl Registry {
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Queue `event` for every subscriber. Returns the number reached and the
    /// largest backlog after queuing.
    pub(crate) fn fan_out(&mut self, event: &LedgerSignatureEvent) -> (usize, usize) {
        let mut max_backlog = 0;
        self.entries.retain(|entry| {
            if entry.sender.send(event.clone()).is_err() {
                return false;
            }
            let backlog = entry.backlog.fetch_add(1, Ordering::SeqCst) + 1;
            max_backlog = max_backlog.max(backlog);
            true
        });
        (self.entries.len(), max_backlog)
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|entry| entry.id != id);
    }
}

/// A subscription handle for receiving signature events.
///
/// When dropped, the subscription is automatically unregistered.
pub struct Subscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<LedgerSignatureEvent>,
    backlog: Arc<AtomicUsize>,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub(crate) fn register(registry: &Arc<Mutex<Registry>>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let backlog = Arc::new(AtomicUsize::new(0));
        let mut guard = registry.lock();
        let id = guard.next_id;
        guard.next_id += 1;
        guard.entries.push(Entry {
            id,
            sender,
            backlog: Arc::clone(&backlog),
        });
        Self {
            id,
            receiver,
            backlog,
            registry: Arc::downgrade(registry),
        }
    }

    /// Receive the next signature event.
    ///
    /// # Returns
    ///
    /// - `Some(event)` - The next event
    /// - `None` - The bus was dropped and every queued event consumed
    pub async fn recv(&mut self) -> Option<LedgerSignatureEvent> {
        let event = self.receiver.recv().await?;
        self.backlog.fetch_sub(1, Ordering::SeqCst);
        Some(event)
    }

    /// Try to receive the next event without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(event))` - An event was available
    /// - `Ok(None)` - No event available (would block)
    /// - `Err(SubscriptionError::Closed)` - The channel was closed
    pub fn try_recv(&mut self) -> Result<Option<LedgerSignatureEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => {
                self.backlog.fetch_sub(1, Ordering::SeqCst);
                Ok(Some(event))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Events queued but not yet received.
    #[must_use]
    pub fn backlog(&self) -> usize {
        self.backlog.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut guard = registry.lock();
            guard.remove(self.id);
            debug!(registrations = guard.len(), "Signature subscription dropped");
        }
    }
}

/// A registered signature callback.
///
/// The callback is driven by a dedicated task. `unregister` (or dropping the
/// registration) stops delivery; no event published afterwards reaches it.
pub struct ConsumerRegistration {
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ConsumerRegistration {
    pub(crate) fn spawn<F>(mut subscription: Subscription, consumer: F) -> Self
    where
        F: Fn(LedgerSignatureEvent) + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let task_active = Arc::clone(&active);
        let handle = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                if !task_active.load(Ordering::SeqCst) {
                    break;
                }
                consumer(event);
            }
        });
        Self { active, handle }
    }

    /// Whether the consumer still receives events.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && !self.handle.is_finished()
    }

    /// Stop delivering events to this consumer.
    pub fn unregister(self) {
        // Drop does the work
    }
}

impl Drop for ConsumerRegistration {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        self.handle.abort();
    }
}
