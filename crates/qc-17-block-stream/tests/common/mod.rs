//! Shared fixtures for block stream integration tests.

#![allow(dead_code)]

use qc_17_block_stream::adapters::{InMemoryStateStore, InMemoryWriterFactory, RecordingLedgerSigner};
use qc_17_block_stream::domain::{
    EventTransaction, RecordFileItem, ResultStatus, StateChange, StateChangeValue, StateChanges,
    TransactionResult,
};
use qc_17_block_stream::{
    BlockItem, BlockStreamConfig, BlockStreamManager, ConsensusRound, Metrics,
    PendingProofLedger, StartupConfig, Timestamp,
};
use std::sync::Arc;

pub struct Node {
    pub manager: BlockStreamManager,
    pub ledger: Arc<PendingProofLedger>,
    pub signer: Arc<RecordingLedgerSigner>,
    pub writers: InMemoryWriterFactory,
    pub store: Arc<InMemoryStateStore>,
    pub metrics: Arc<Metrics>,
}

pub fn node(rounds_per_block: u32, startup: StartupConfig) -> Node {
    let writers = InMemoryWriterFactory::new();
    let store = Arc::new(InMemoryStateStore::new());
    let signer = Arc::new(RecordingLedgerSigner::new());
    let metrics = Arc::new(Metrics::new());
    let ledger = Arc::new(PendingProofLedger::new(signer.clone(), metrics.clone()));
    let manager = BlockStreamManager::new(
        BlockStreamConfig::default().with_rounds_per_block(rounds_per_block),
        startup,
        Arc::new(writers.clone()),
        store.clone(),
        ledger.clone(),
        metrics.clone(),
    )
    .expect("manager");
    Node {
        manager,
        ledger,
        signer,
        writers,
        store,
        metrics,
    }
}

pub fn round(number: u64) -> ConsensusRound {
    ConsensusRound::new(number, Timestamp::new(1_700_000_000 + number as i64, 0))
}

pub fn event_transaction(tag: u8) -> BlockItem {
    BlockItem::EventTransaction(EventTransaction {
        application_transaction: vec![tag; 32],
    })
}

pub fn transaction_result(fee: u64) -> BlockItem {
    BlockItem::TransactionResult(TransactionResult {
        status: ResultStatus::Success,
        consensus_timestamp: Timestamp::new(1_700_000_000, fee as u32),
        transaction_fee_charged: fee,
    })
}

pub fn state_changes() -> BlockItem {
    BlockItem::StateChanges(StateChanges {
        consensus_timestamp: Timestamp::new(1_700_000_000, 0),
        state_changes: vec![StateChange {
            state_name: "accounts".to_string(),
            value: StateChangeValue::Raw(vec![1, 2, 3]),
        }],
    })
}

pub fn record_file() -> BlockItem {
    BlockItem::RecordFile(RecordFileItem {
        creation_time: Timestamp::new(1_700_000_000, 0),
        record_file_contents: b"record".to_vec(),
    })
}

/// The four kinds of item a round typically produces.
pub fn round_items(tag: u8) -> Vec<BlockItem> {
    vec![
        event_transaction(tag),
        transaction_result(u64::from(tag)),
        state_changes(),
        record_file(),
    ]
}

pub const FIRST_SIGNATURE: [u8; 48] = [0xff; 48];
pub const SECOND_SIGNATURE: [u8; 48] = [0xee; 48];
