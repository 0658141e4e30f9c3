//! Runs the wired node against a temporary directory.

use node_runtime::{NodeConfig, NodeRuntime, SimulationConfig};
use qc_17_block_stream::BlockStreamConfig;
use quantum_telemetry::TelemetryConfig;
use std::path::Path;
use std::time::Duration;

fn config(dir: &Path, rounds: u64, freeze_round: Option<u64>) -> NodeConfig {
    let mut block_stream = BlockStreamConfig::default().with_rounds_per_block(3);
    block_stream.block_dir = dir.join("blocks");
    block_stream.state_path = dir.join("state.json");
    NodeConfig {
        block_stream,
        telemetry: TelemetryConfig::default(),
        simulation: SimulationConfig {
            rounds,
            transactions_per_round: 2,
            freeze_round,
            rng_seed: Some(42),
        },
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn node_produces_proven_blocks_and_resumes() {
    let dir = tempfile::tempdir().unwrap();

    let mut node = NodeRuntime::start(config(dir.path(), 9, None)).unwrap();
    let first = node.run(Duration::from_secs(5)).await.unwrap();
    node.shutdown().await.unwrap();

    assert_eq!(first.rounds, 9);
    assert_eq!(first.blocks_closed, 3);
    assert_eq!(first.last_block_number, Some(2));
    assert_eq!(first.unproven, 0);
    assert!(dir.path().join("state.json").exists());

    let mut node = NodeRuntime::start(config(dir.path(), 3, None)).unwrap();
    let second = node.run(Duration::from_secs(5)).await.unwrap();
    node.shutdown().await.unwrap();

    assert_eq!(second.blocks_closed, 1);
    assert_eq!(second.last_block_number, Some(3));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn freeze_round_stops_the_feed() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = NodeRuntime::start(config(dir.path(), 10, Some(2))).unwrap();
    let summary = node.run(Duration::from_secs(5)).await.unwrap();
    node.shutdown().await.unwrap();

    assert!(summary.frozen);
    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.blocks_closed, 1);
    assert_eq!(summary.unproven, 0);
}
