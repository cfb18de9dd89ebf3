// ── Column layout persistence ──
//
// A durable key/value slot per view holding the JSON array of column
// configurations. Reads fall back to the caller's default on any
// problem; writes are fire-and-forget.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::ColumnConfig;

/// Durable single-slot-per-key string storage.
pub trait ColumnStore: Send + Sync {
    /// Stored value for `key`, or `None` if nothing was saved.
    fn load(&self, key: &str) -> Result<Option<String>, CoreError>;

    /// Overwrite the slot for `key`.
    fn save(&self, key: &str, value: &str) -> Result<(), CoreError>;

    /// Drop the slot for `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), CoreError>;
}

// ── File-backed ──────────────────────────────────────────────────────

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileColumnStore {
    dir: PathBuf,
}

impl FileColumnStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `key`. Path separators in keys are neutralized.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

fn io_error(path: &Path, e: &std::io::Error) -> CoreError {
    CoreError::Persistence {
        message: format!("{}: {e}", path.display()),
    }
}

impl ColumnStore for FileColumnStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, &e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, &e))?;
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|e| io_error(&path, &e))
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(io_error(&path, &e)),
            _ => Ok(()),
        }
    }
}

// ── In-memory ────────────────────────────────────────────────────────

/// Process-local store, for tests and for sessions that persist nothing.
#[derive(Debug, Default)]
pub struct MemoryColumnStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryColumnStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CoreError> {
        self.slots.lock().map_err(|_| CoreError::Persistence {
            message: "column store lock poisoned".into(),
        })
    }
}

impl ColumnStore for MemoryColumnStore {
    fn load(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.slots()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        self.slots()?.remove(key);
        Ok(())
    }
}

// ── Typed helpers ────────────────────────────────────────────────────

/// Load the persisted layout for `key`, or `default` when it is absent,
/// unreadable or corrupt.
pub fn load_columns(store: &dyn ColumnStore, key: &str, default: &[ColumnConfig]) -> Vec<ColumnConfig> {
    match store.load(key) {
        Ok(Some(raw)) => match serde_json::from_str::<Vec<ColumnConfig>>(&raw) {
            Ok(cols) => {
                debug!(key, count = cols.len(), "loaded column layout");
                cols
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring corrupt column layout");
                default.to_vec()
            }
        },
        Ok(None) => default.to_vec(),
        Err(e) => {
            warn!(key, error = %e, "failed to load column layout");
            default.to_vec()
        }
    }
}

/// Persist the full layout under `key`. Failures are logged, not returned.
pub fn save_columns(store: &dyn ColumnStore, key: &str, columns: &[ColumnConfig]) {
    let result = serde_json::to_string(columns)
        .map_err(CoreError::from)
        .and_then(|raw| store.save(key, &raw));
    if let Err(e) = result {
        warn!(key, error = %e, "failed to persist column layout");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn default_layout() -> Vec<ColumnConfig> {
        vec![ColumnConfig::new("code", 80, 0), ColumnConfig::new("name", 200, 1)]
    }

    #[test]
    fn missing_slot_yields_default() {
        let store = MemoryColumnStore::new();
        assert_eq!(load_columns(&store, "columns.customer", &default_layout()), default_layout());
    }

    #[test]
    fn corrupt_slot_yields_default() {
        let store = MemoryColumnStore::new();
        store.save("columns.customer", "{not json").unwrap();
        assert_eq!(load_columns(&store, "columns.customer", &default_layout()), default_layout());
    }

    #[test]
    fn saved_layout_wins_over_default() {
        let store = MemoryColumnStore::new();
        let mut cols = default_layout();
        cols[1].pinned = true;
        save_columns(&store, "k", &cols);
        assert_eq!(load_columns(&store, "k", &default_layout()), cols);
    }

    #[test]
    fn file_store_round_trips_and_removes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileColumnStore::new(dir.path().join("layouts"));
        assert!(store.load("columns.customer").unwrap().is_none());

        store.save("columns.customer", "[]").unwrap();
        assert!(store.path_for("columns.customer").exists());
        assert_eq!(store.load("columns.customer").unwrap().as_deref(), Some("[]"));

        store.remove("columns.customer").unwrap();
        store.remove("columns.customer").unwrap();
        assert!(store.load("columns.customer").unwrap().is_none());
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let store = FileColumnStore::new("/tmp/layouts");
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/tmp/layouts/.._etc_passwd.json"));
    }

    #[test]
    fn layout_is_stored_as_camel_case_json() {
        let store = MemoryColumnStore::new();
        save_columns(&store, "k", &[ColumnConfig::new("code", 80, 0)]);
        let raw = store.load("k").unwrap().unwrap();
        assert!(raw.contains("\"dataField\":\"code\""));
        assert!(raw.contains("\"originalOrder\":0"));
    }
}
