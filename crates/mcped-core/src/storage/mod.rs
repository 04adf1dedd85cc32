//! Persistence of the editor's entry list.
//!
//! Only the entry list is stored; notices and other transient state are not.
//! The record keeps the `{ "state": { "servers": [...] }, "version": 0 }`
//! envelope so a future shape change can be detected.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::mcp::ServerEntry;

/// Record name, used as the storage file stem.
pub const STORAGE_NAME: &str = "mcped-storage";
pub const STORAGE_VERSION: u32 = 0;

/// The persisted subset of editor state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedRecord {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

/// Key/value backend holding a single [`PersistedState`] record.
pub trait StateStorage {
    /// `None` when nothing has been saved yet.
    fn load(&self) -> anyhow::Result<Option<PersistedState>>;
    fn save(&self, state: &PersistedState) -> anyhow::Result<()>;
}

/// JSON file backend.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/mcped/mcped-storage.json`.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(data_dir
            .join("mcped")
            .join(format!("{STORAGE_NAME}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for FileStorage {
    fn load(&self) -> anyhow::Result<Option<PersistedState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read storage file: {}", self.path.display()))?;
        let record: PersistedRecord = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse storage file: {}", self.path.display()))?;
        if record.version != STORAGE_VERSION {
            tracing::warn!(
                version = record.version,
                expected = STORAGE_VERSION,
                "storage record version differs"
            );
        }
        Ok(Some(record.state))
    }

    fn save(&self, state: &PersistedState) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create storage directory: {}", parent.display())
            })?;
        }
        let record = PersistedRecord {
            state: state.clone(),
            version: STORAGE_VERSION,
        };
        let bytes = serde_json::to_vec_pretty(&record).context("Failed to serialize storage")?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("Failed to write storage file: {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process backend for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: RefCell<Option<PersistedState>>,
    saves: RefCell<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: PersistedState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            saves: RefCell::new(0),
        }
    }

    pub fn snapshot(&self) -> Option<PersistedState> {
        self.state.borrow().clone()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self) -> anyhow::Result<Option<PersistedState>> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &PersistedState) -> anyhow::Result<()> {
        *self.state.borrow_mut() = Some(state.clone());
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("state.json"));
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_writes_envelope() {
        let temp = TempDir::new().unwrap();
        let storage = FileStorage::new(temp.path().join("nested").join("state.json"));
        let state = PersistedState {
            servers: vec![ServerEntry::stdio("server-1")],
        };
        storage.save(&state).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["version"], 0);
        assert_eq!(raw["state"]["servers"][0]["key"], "server-1");
        assert_eq!(raw["state"]["servers"][0]["type"], "stdio");

        assert_eq!(storage.load().unwrap(), Some(state));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("state.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = FileStorage::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("Failed to parse storage file"));
    }

    #[test]
    fn memory_storage_counts_saves() {
        let storage = MemoryStorage::new();
        assert!(storage.load().unwrap().is_none());
        storage.save(&PersistedState::default()).unwrap();
        assert_eq!(storage.save_count(), 1);
        assert_eq!(storage.load().unwrap(), Some(PersistedState::default()));
    }
}
