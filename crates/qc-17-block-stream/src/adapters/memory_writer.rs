//! In-memory block writer with a shared event log.
//!
//! Every writer created by one [`InMemoryWriterFactory`] appends to the same
//! log, so tests can assert the exact order of opens, items and closes.

use crate::domain::BlockItem;
use crate::ports::{BlockItemWriter, BlockItemWriterFactory};
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

/// One call observed by an in-memory writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriterEvent {
    /// `open_block(number)`
    Opened(u64),
    /// `write_item(bytes)` for a block
    Item {
        /// Block the item went to
        block: u64,
        /// Encoded item
        bytes: Vec<u8>,
    },
    /// `close_block()` for a block
    Closed(u64),
}

/// Operation the factory's writers should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriterFailure {
    /// Fail `open_block`
    Open,
    /// Fail `write_item`
    Write,
    /// Fail `close_block`
    Close,
}

#[derive(Default)]
struct Shared {
    events: Mutex<Vec<WriterEvent>>,
    failure: Mutex<Option<WriterFailure>>,
}

impl Shared {
    fn check(&self, op: WriterFailure) -> io::Result<()> {
        if *self.failure.lock() == Some(op) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected {op:?} failure"),
            ));
        }
        Ok(())
    }
}

struct InMemoryBlockWriter {
    shared: Arc<Shared>,
    block: Option<u64>,
}

impl InMemoryBlockWriter {
    fn block(&self) -> io::Result<u64> {
        self.block
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "no block open"))
    }
}

impl BlockItemWriter for InMemoryBlockWriter {
    fn open_block(&mut self, number: u64) -> io::Result<()> {
        self.shared.check(WriterFailure::Open)?;
        self.block = Some(number);
        self.shared.events.lock().push(WriterEvent::Opened(number));
        Ok(())
    }

    fn write_item(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.shared.check(WriterFailure::Write)?;
        let block = self.block()?;
        self.shared.events.lock().push(WriterEvent::Item {
            block,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }

    fn close_block(&mut self) -> io::Result<()> {
        self.shared.check(WriterFailure::Close)?;
        let block = self.block()?;
        self.block = None;
        self.shared.events.lock().push(WriterEvent::Closed(block));
        Ok(())
    }
}

/// Factory for writers sharing one event log.
#[derive(Clone, Default)]
pub struct InMemoryWriterFactory {
    shared: Arc<Shared>,
}

impl InMemoryWriterFactory {
    /// Factory with an empty event log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every writer fail `op` from now on; `None` clears it.
    pub fn set_failure(&self, failure: Option<WriterFailure>) {
        *self.shared.failure.lock() = failure;
    }

    /// Snapshot of the event log.
    pub fn events(&self) -> Vec<WriterEvent> {
        self.shared.events.lock().clone()
    }

    /// Decoded items written to `block`, in order.
    pub fn items_for(&self, block: u64) -> Vec<BlockItem> {
        self.shared
            .events
            .lock()
            .iter()
            .filter_map(|event| match event {
                WriterEvent::Item { block: b, bytes } if *b == block => {
                    BlockItem::decode(bytes).ok()
                }
                _ => None,
            })
            .collect()
    }

    /// Last item written to `block`.
    pub fn last_item(&self, block: u64) -> Option<BlockItem> {
        self.items_for(block).pop()
    }

    /// Blocks opened so far, in order.
    pub fn opened_blocks(&self) -> Vec<u64> {
        self.collect(|event| match event {
            WriterEvent::Opened(n) => Some(*n),
            _ => None,
        })
    }

    /// Blocks closed so far, in order.
    pub fn closed_blocks(&self) -> Vec<u64> {
        self.collect(|event| match event {
            WriterEvent::Closed(n) => Some(*n),
            _ => None,
        })
    }

    /// Whether `block` was closed.
    pub fn is_closed(&self, block: u64) -> bool {
        self.closed_blocks().contains(&block)
    }

    fn collect(&self, f: impl Fn(&WriterEvent) -> Option<u64>) -> Vec<u64> {
        self.shared.events.lock().iter().filter_map(f).collect()
    }
}

impl BlockItemWriterFactory for InMemoryWriterFactory {
    fn create(&self) -> io::Result<Box<dyn BlockItemWriter>> {
        Ok(Box::new(InMemoryBlockWriter {
            shared: Arc::clone(&self.shared),
            block: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventTransaction;

    #[test]
    fn test_event_log_order() {
        let factory = InMemoryWriterFactory::new();
        let mut a = factory.create().unwrap();
        let mut b = factory.create().unwrap();

        let item = BlockItem::EventTransaction(EventTransaction {
            application_transaction: vec![1],
        });
        a.open_block(1).unwrap();
        b.open_block(2).unwrap();
        a.write_item(&item.encode().unwrap()).unwrap();
        b.close_block().unwrap();

        assert_eq!(factory.opened_blocks(), vec![1, 2]);
        assert_eq!(factory.closed_blocks(), vec![2]);
        assert_eq!(factory.items_for(1), vec![item]);
        assert!(factory.items_for(2).is_empty());
    }

    #[test]
    fn test_injected_failure() {
        let factory = InMemoryWriterFactory::new();
        let mut writer = factory.create().unwrap();
        factory.set_failure(Some(WriterFailure::Open));
        assert!(writer.open_block(0).is_err());
        factory.set_failure(None);
        assert!(writer.open_block(0).is_ok());
    }
}
