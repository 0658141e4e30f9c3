//! Block assembly and proof scenarios.

mod common;

use common::*;
use qc_17_block_stream::domain::{BlockStreamState, ProofKind};
use qc_17_block_stream::{
    BlockItem, BlockStreamError, BlockStreamProducer, BlockStreamQueries, StartupConfig,
};
use shared_crypto::{combine, fold_hashes, ZERO_HASH};

#[test]
fn one_round_closes_one_block_with_direct_proof() {
    let mut n = node(1, StartupConfig::genesis());
    let query = n.manager.query();
    let result = transaction_result(5);

    let closed = n
        .manager
        .process_round(round(1).with_items(vec![event_transaction(1), result.clone()]))
        .unwrap()
        .expect("one round closes the block");

    assert_eq!(closed.number, 0);
    assert_eq!(
        closed.output_root,
        combine(&ZERO_HASH, &result.hash().unwrap())
    );
    assert_eq!(query.current_seed(), None);
    assert_eq!(query.hash_of(0), Some(closed.block_hash));
    assert_eq!(n.signer.requests(), vec![closed.block_hash]);

    let finalized = n
        .ledger
        .on_signature(&closed.block_hash, &FIRST_SIGNATURE)
        .unwrap();
    assert_eq!(finalized.len(), 1);
    assert_eq!(finalized[0].kind, ProofKind::Direct);

    let Some(BlockItem::BlockProof(proof)) = n.writers.last_item(0) else {
        panic!("block must end with its proof");
    };
    assert_eq!(proof.block, 0);
    assert_eq!(proof.block_signature, FIRST_SIGNATURE.to_vec());
    assert!(proof.sibling_hashes.is_empty());
    assert_eq!(proof.previous_block_root_hash, ZERO_HASH);
    assert!(n.writers.is_closed(0));
}

#[test]
fn block_spans_configured_rounds() {
    let mut n = node(7, StartupConfig::genesis());
    for r in 1..=6 {
        let closed = n
            .manager
            .process_round(round(r).with_items(round_items(r as u8)))
            .unwrap();
        assert!(closed.is_none(), "round {r} must not close the block");
        assert!(n.signer.requests().is_empty());
    }
    assert_eq!(n.writers.opened_blocks(), vec![0]);

    let closed = n
        .manager
        .process_round(round(7).with_items(round_items(7)))
        .unwrap()
        .expect("seventh round closes");
    assert_eq!(closed.rounds, 7);
    // header + 7 rounds of 4 items + boundary state changes
    assert_eq!(closed.item_count, 30);
    assert_eq!(n.signer.requests(), vec![closed.block_hash]);
}

#[test]
fn freeze_round_closes_block_early() {
    let mut n = node(7, StartupConfig::genesis());
    let closed = n
        .manager
        .process_round(round(1).with_items(round_items(1)).with_freeze())
        .unwrap()
        .expect("freeze closes the block");

    assert!(closed.frozen);
    assert_eq!(closed.rounds, 1);
    assert!(n.manager.is_frozen());
    assert_eq!(n.signer.requests(), vec![closed.block_hash]);
    assert!(matches!(
        n.manager.start_round(&round(2)),
        Err(BlockStreamError::Frozen { block_number: 0 })
    ));
}

#[test]
fn later_signature_finalizes_earlier_block_indirectly() {
    let state = BlockStreamState {
        block_number: Some(99),
        trailing_block_hashes: vec![[0x42; 48]],
        ..Default::default()
    };
    let mut n = node(1, StartupConfig::resume(state, [0x43; 48]));

    let first = n
        .manager
        .process_round(round(1).with_items(round_items(1)))
        .unwrap()
        .unwrap();
    let second = n
        .manager
        .process_round(round(2).with_items(round_items(2)))
        .unwrap()
        .unwrap();
    assert_eq!((first.number, second.number), (100, 101));
    assert_eq!(first.previous_block_hash, [0x43; 48]);

    // N+1 is signed before N
    let finalized = n
        .ledger
        .on_signature(&second.block_hash, &FIRST_SIGNATURE)
        .unwrap();
    assert_eq!(
        finalized.iter().map(|f| f.number).collect::<Vec<_>>(),
        vec![100, 101]
    );

    let Some(BlockItem::BlockProof(indirect)) = n.writers.last_item(100) else {
        panic!("block N must end with a proof");
    };
    assert_eq!(indirect.sibling_hashes.len(), 2);
    assert_eq!(indirect.block_signature, FIRST_SIGNATURE.to_vec());
    assert_eq!(
        fold_hashes(&first.block_hash, &indirect.sibling_hashes),
        second.block_hash
    );

    let Some(BlockItem::BlockProof(direct)) = n.writers.last_item(101) else {
        panic!("block N+1 must end with a proof");
    };
    assert!(direct.sibling_hashes.is_empty());
    assert_eq!(direct.previous_block_root_hash, first.block_hash);

    // N's own signature arrives late and changes nothing
    let before = n.writers.events();
    let late = n
        .ledger
        .on_signature(&first.block_hash, &SECOND_SIGNATURE)
        .unwrap();
    assert!(late.is_empty());
    assert_eq!(n.writers.events(), before);
    assert_eq!(n.ledger.pending_count(), 0);
}

#[test]
fn production_requires_last_block_hash() {
    let state = BlockStreamState {
        block_number: Some(10),
        ..Default::default()
    };
    let mut n = node(1, StartupConfig::uninitialized(state));
    assert!(matches!(
        n.manager.start_round(&round(1)),
        Err(BlockStreamError::UninitializedChain)
    ));
    assert!(!n.manager.is_halted());
    assert!(n.writers.opened_blocks().is_empty());
}

#[test]
fn seed_is_output_root_from_four_closures_ago() {
    let mut n = node(1, StartupConfig::genesis());
    let query = n.manager.query();
    let mut roots = Vec::new();
    for r in 1..=8u64 {
        let closed = n
            .manager
            .process_round(round(r).with_items(vec![transaction_result(r)]))
            .unwrap()
            .unwrap();
        roots.push(closed.output_root);
        if roots.len() <= 4 {
            assert_eq!(query.current_seed(), None);
        } else {
            assert_eq!(query.current_seed(), Some(roots[roots.len() - 5]));
        }
    }
}

#[test]
fn seed_does_not_move_within_a_block() {
    let mut n = node(1, StartupConfig::genesis());
    for r in 1..=5 {
        n.manager
            .process_round(round(r).with_items(vec![transaction_result(r)]))
            .unwrap();
    }
    let query = n.manager.query();
    let seed = query.current_seed();
    assert!(seed.is_some());

    n.manager.start_round(&round(6)).unwrap();
    for fee in 0..10 {
        n.manager.write_item(transaction_result(fee)).unwrap();
        assert_eq!(query.current_seed(), seed);
    }
}

#[test]
fn restart_continues_the_chain() {
    let mut first = node(1, StartupConfig::genesis());
    let mut hashes = Vec::new();
    for r in 1..=3 {
        let closed = first
            .manager
            .process_round(round(r).with_items(round_items(r as u8)))
            .unwrap()
            .unwrap();
        hashes.push(closed.block_hash);
    }
    let persisted = first.store.current();

    let mut second = node(1, StartupConfig::from_persisted(persisted));
    let query = second.manager.query();
    assert_eq!(query.current_block_number(), Some(2));
    assert_eq!(query.hash_of(0), Some(hashes[0]));
    assert_eq!(query.last_block_hash(), Some(hashes[2]));

    let next = second
        .manager
        .process_round(round(4).with_items(round_items(4)))
        .unwrap()
        .unwrap();
    assert_eq!(next.number, 3);
    assert_eq!(next.previous_block_hash, hashes[2]);
    assert_eq!(
        next.block_hash,
        fold_hashes(&hashes[2], &[next.input_root, next.output_root])
    );
}

#[test]
fn genesis_recovery_restarts_numbering_after_state() {
    let state = BlockStreamState {
        block_number: Some(41),
        ..Default::default()
    };
    let mut n = node(1, StartupConfig::from_persisted(Some(state)));
    let closed = n.manager.process_round(round(1)).unwrap().unwrap();
    assert_eq!(closed.number, 42);
    assert_eq!(closed.previous_block_hash, ZERO_HASH);
    assert_eq!(n.manager.query().hash_of(41), None);
}

#[test]
fn hash_of_answers_none_past_horizon() {
    let mut n = node(1, StartupConfig::genesis());
    for r in 1..=300 {
        n.manager.process_round(round(r)).unwrap();
    }
    let query = n.manager.query();
    assert_eq!(query.current_block_number(), Some(299));
    assert_eq!(query.hash_of(43), None);
    assert!(query.hash_of(44).is_some());
    assert!(query.hash_of(299).is_some());
    assert_eq!(query.hash_of(300), None);
    assert_eq!(n.manager.state().trailing_block_hashes.len(), 256);
}
