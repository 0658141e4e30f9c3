//! Synthetic consensus feed.
//!
//! Stands in for the consensus handler: produces numbered rounds with
//! monotonically increasing consensus time and a handful of items each.

use crate::config::SimulationConfig;
use qc_17_block_stream::domain::{
    EventTransaction, ResultStatus, StateChange, StateChangeValue, StateChanges,
    TransactionResult,
};
use qc_17_block_stream::{BlockItem, ConsensusRound, Timestamp};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Nanoseconds between consecutive synthetic rounds.
const ROUND_INTERVAL_NANOS: u64 = 250_000_000;

/// Iterator over synthetic consensus rounds.
pub struct SyntheticConsensus {
    config: SimulationConfig,
    rng: StdRng,
    next_round: u64,
    clock: Timestamp,
}

impl SyntheticConsensus {
    /// Feed starting at round 1 and the given consensus time.
    pub fn new(config: SimulationConfig, start: Timestamp) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            rng,
            next_round: 1,
            clock: start,
        }
    }

    fn transaction(&mut self, at: Timestamp) -> [BlockItem; 2] {
        let mut payload = vec![0u8; self.rng.gen_range(16..128)];
        self.rng.fill_bytes(&mut payload);
        let status = if self.rng.gen_bool(0.95) {
            ResultStatus::Success
        } else {
            ResultStatus::Failed
        };
        [
            BlockItem::EventTransaction(EventTransaction {
                application_transaction: payload,
            }),
            BlockItem::TransactionResult(TransactionResult {
                status,
                consensus_timestamp: at,
                transaction_fee_charged: self.rng.gen_range(100_000..10_000_000),
            }),
        ]
    }
}

impl Iterator for SyntheticConsensus {
    type Item = ConsensusRound;

    fn next(&mut self) -> Option<ConsensusRound> {
        if self.next_round > self.config.rounds {
            return None;
        }
        let round_number = self.next_round;
        let round_time = self.clock;
        self.next_round += 1;
        self.clock = self.clock.plus_nanos(ROUND_INTERVAL_NANOS);

        let mut items = Vec::with_capacity(self.config.transactions_per_round * 2 + 1);
        for i in 0..self.config.transactions_per_round {
            let at = round_time.plus_nanos(i as u64 * 1_000);
            items.extend(self.transaction(at));
        }
        items.push(BlockItem::StateChanges(StateChanges {
            consensus_timestamp: round_time,
            state_changes: vec![StateChange {
                state_name: "round".to_string(),
                value: StateChangeValue::Raw(round_number.to_le_bytes().to_vec()),
            }],
        }));

        let round = ConsensusRound::new(round_number, round_time).with_items(items);
        if self.config.freeze_round == Some(round_number) {
            Some(round.with_freeze())
        } else {
            Some(round)
        }
    }
}
