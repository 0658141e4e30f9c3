//! State store adapters.

use crate::domain::BlockStreamState;
use crate::error::{BlockStreamError, Result};
use crate::ports::BlockStreamStateStore;
use parking_lot::RwLock;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Keeps the state in memory; counts saves.
#[derive(Default)]
pub struct InMemoryStateStore {
    state: RwLock<Option<BlockStreamState>>,
    saves: AtomicU64,
}

impl InMemoryStateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `state`.
    pub fn with_state(state: BlockStreamState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
            saves: AtomicU64::new(0),
        }
    }

    /// Number of `save` calls.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    /// Last saved state.
    pub fn current(&self) -> Option<BlockStreamState> {
        self.state.read().clone()
    }
}

impl BlockStreamStateStore for InMemoryStateStore {
    fn load(&self) -> Result<Option<BlockStreamState>> {
        Ok(self.state.read().clone())
    }

    fn save(&self, state: &BlockStreamState) -> Result<()> {
        *self.state.write() = Some(state.clone());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Persists the state as JSON, replacing the file atomically.
pub struct JsonFileStateStore {
    path: PathBuf,
}

impl JsonFileStateStore {
    /// Store backed by the JSON file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn store_err(context: &str, path: &Path, err: impl std::fmt::Display) -> BlockStreamError {
    BlockStreamError::StateStore(format!("{context} {}: {err}", path.display()))
}

impl BlockStreamStateStore for JsonFileStateStore {
    fn load(&self) -> Result<Option<BlockStreamState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(store_err("read", &self.path, e)),
        };
        let state = serde_json::from_str(&raw).map_err(|e| store_err("parse", &self.path, e))?;
        Ok(Some(state))
    }

    fn save(&self, state: &BlockStreamState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| store_err("create", parent, e))?;
            }
        }
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| BlockStreamError::Serialization(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, json).map_err(|e| store_err("write", &tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| store_err("rename", &self.path, e))?;
        debug!(path = %self.path.display(), block_number = ?state.block_number, "Saved block stream state");
        Ok(())
    }
}
