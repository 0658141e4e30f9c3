//! Configuration for the block stream

use crate::error::{BlockStreamError, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration for block assembly
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BlockStreamConfig {
    /// Consensus rounds per block (default: 1)
    pub rounds_per_block: u32,

    /// Version string written into block headers
    pub software_version: String,

    /// Directory for block files
    pub block_dir: PathBuf,

    /// Path of the persisted block stream state
    pub state_path: PathBuf,

    /// Signature backlog per subscriber that triggers a warning
    pub signature_channel_capacity: usize,
}

impl Default for BlockStreamConfig {
    fn default() -> Self {
        Self {
            rounds_per_block: crate::DEFAULT_ROUNDS_PER_BLOCK,
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            block_dir: PathBuf::from("data/blocks"),
            state_path: PathBuf::from("data/block_stream_state.json"),
            signature_channel_capacity: shared_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl BlockStreamConfig {
    /// Defaults overridden by environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_BLOCK_STREAM_ROUNDS_PER_BLOCK`
    /// - `QC_BLOCK_STREAM_DIR`
    /// - `QC_BLOCK_STREAM_STATE_PATH`
    /// - `QC_SIGNATURE_CHANNEL_CAPACITY`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(rounds) = parse_env("QC_BLOCK_STREAM_ROUNDS_PER_BLOCK")? {
            config.rounds_per_block = rounds;
        }
        if let Ok(dir) = env::var("QC_BLOCK_STREAM_DIR") {
            config.block_dir = PathBuf::from(dir);
        }
        if let Ok(path) = env::var("QC_BLOCK_STREAM_STATE_PATH") {
            config.state_path = PathBuf::from(path);
        }
        if let Some(capacity) = parse_env("QC_SIGNATURE_CHANNEL_CAPACITY")? {
            config.signature_channel_capacity = capacity;
        }
        config.validate()?;
        Ok(config)
    }

    /// Config with a different rounds-per-block value.
    pub fn with_rounds_per_block(mut self, rounds_per_block: u32) -> Self {
        self.rounds_per_block = rounds_per_block;
        self
    }

    /// Reject values the stream cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rounds_per_block == 0 {
            return Err(BlockStreamError::InvalidConfig(
                "rounds_per_block must be at least 1".into(),
            ));
        }
        if self.signature_channel_capacity == 0 {
            return Err(BlockStreamError::InvalidConfig(
                "signature_channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| BlockStreamError::InvalidConfig(format!("{key}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}
