//! Durable storage for the brain state
//!
//! The whole state is read and written as one JSON document. Callers always
//! work on a full snapshot and hand a full snapshot back.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::BrainState;

/// Errors from persistence operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store is read-only")]
    ReadOnly,
}

/// Backing storage for [`BrainState`]
pub trait StateStore: Send + Sync {
    /// Read the current state.
    ///
    /// A missing or unreadable backing store yields a fresh empty state.
    fn load(&self) -> BrainState;

    /// Persist the full state
    fn save(&self, state: &BrainState) -> Result<(), StoreError>;

    /// Human-readable location, used in logs
    fn describe(&self) -> String;

    /// Write an initial state when nothing has been persisted yet
    fn init(&self) -> Result<BrainState, StoreError> {
        Ok(self.load())
    }
}

/// Pretty-printed JSON file on disk
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "baby_data.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> BrainState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to read {}: {}", self.path.display(), e);
                }
                return BrainState::default();
            }
        };

        match serde_json::from_str::<BrainState>(&content) {
            Ok(mut state) => {
                state.normalize();
                state
            }
            Err(e) => {
                warn!("Corrupt data file {}, starting empty: {}", self.path.display(), e);
                BrainState::default()
            }
        }
    }

    fn save(&self, state: &BrainState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }

        let json = serde_json::to_string_pretty(state)?;

        // Rename is atomic on the same filesystem, so readers never see a half-written file
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;

        debug!(
            "Saved {} trigger(s) to {}",
            state.conversations.len(),
            self.path.display()
        );
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn init(&self) -> Result<BrainState, StoreError> {
        if self.path.exists() {
            return Ok(self.load());
        }

        let state = BrainState::fresh();
        self.save(&state)?;
        info!("Initialized empty data file at {}", self.path.display());
        Ok(state)
    }
}

/// In-process store, mostly for tests and dry runs
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<BrainState>,
    read_only: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: BrainState) -> Self {
        Self {
            state: RwLock::new(state),
            read_only: RwLock::new(false),
        }
    }

    /// Make every subsequent `save` fail
    pub fn set_read_only(&self, read_only: bool) {
        *self.read_only.write().unwrap_or_else(PoisonError::into_inner) = read_only;
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> BrainState {
        // A writer only ever swaps in a whole snapshot, so a poisoned lock still holds a valid one
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, state: &BrainState) -> Result<(), StoreError> {
        if *self.read_only.read().unwrap_or_else(PoisonError::into_inner) {
            return Err(StoreError::ReadOnly);
        }
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::types::Trigger;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nope.json"));
        let state = store.load();
        assert!(state.conversations.is_empty());
        assert!(state.teachers.is_empty());
        assert_eq!(state.stats.total_conversations, 0);
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baby_data.json");
        std::fs::write(&path, "{ not json").unwrap();
        let state = JsonFileStore::new(&path).load();
        assert!(state.conversations.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("baby_data.json"));

        let mut state = BrainState::default();
        state.conversations.push(Trigger::new("hi", vec!["hello".into(), "hey".into()], None));
        state.teachers.insert("u1".into(), 2);
        state.refresh_stats();
        store.save(&state).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.conversations, state.conversations);
        assert_eq!(loaded.teachers["u1"], 2);
        assert_eq!(loaded.stats.total_teachers, 1);
        assert!(!store.tmp_path().exists());
    }

    #[test]
    fn test_init_writes_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("baby_data.json");
        let store = JsonFileStore::new(&path);

        let first = store.init().unwrap();
        assert!(path.exists());
        assert!(first.stats.created_at.is_some());

        let second = store.init().unwrap();
        assert_eq!(first.stats.created_at, second.stats.created_at);
    }

    #[test]
    fn test_save_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        // Parent is a regular file, so the directory cannot be created
        let store = JsonFileStore::new(blocker.join("baby_data.json"));
        assert!(matches!(store.save(&BrainState::default()), Err(StoreError::Io { .. })));
    }

    #[test]
    fn test_memory_store_read_only() {
        let store = MemoryStore::new();
        store.set_read_only(true);
        assert!(matches!(store.save(&BrainState::default()), Err(StoreError::ReadOnly)));
        store.set_read_only(false);
        assert!(store.save(&BrainState::default()).is_ok());
    }

    #[test]
    fn test_memory_store_survives_poisoned_lock() {
        let store = MemoryStore::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = store.state.write().unwrap();
            panic!("writer died");
        }));
        assert!(result.is_err());
        assert!(store.state.is_poisoned());

        let mut state = BrainState::default();
        state.conversations.push(Trigger::new("hi", vec!["hello".into()], None));
        store.save(&state).unwrap();
        assert_eq!(store.load().conversations, state.conversations);

        store.set_read_only(true);
        assert!(matches!(store.save(&state), Err(StoreError::ReadOnly)));
    }
}
