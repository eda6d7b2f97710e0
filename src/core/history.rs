//! # Input History
//!
//! Submitted lines, kept in a session-scoped key-value store.
//!
//! ```text
//! HistoryStore
//! ├── storage: Box<dyn SessionStorage>   // memory (default) or file-backed
//! ├── key: "genterm.terminal.history"    // JSON array of strings
//! └── capacity: 50                       // oldest entries evicted first
//! ```
//!
//! Storage failures never reach the user: a bad read is an empty history,
//! a failed write is a logged no-op.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};

pub const HISTORY_KEY: &str = "genterm.terminal.history";
pub const HISTORY_CAPACITY: usize = 50;

/// String key-value storage scoped to one terminal session.
pub trait SessionStorage: Send {
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Lives as long as the process. The default.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`.
///
/// All writes use atomic rename (write `.tmp`, then `rename()`).
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// `~/.genterm/session/`, if a home directory exists.
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".genterm").join("session"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(path).map(Some)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        atomic_write(&self.path_for(key), value)
    }
}

/// Atomically write `contents` to `path` (via `.tmp` + rename).
pub(crate) fn atomic_write(path: &Path, contents: &str) -> io::Result<()> {
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub struct HistoryStore {
    storage: Box<dyn SessionStorage>,
    key: String,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        Self {
            storage,
            key: HISTORY_KEY.to_string(),
            capacity: HISTORY_CAPACITY,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()))
    }

    /// Stored entries, oldest first. Empty on any storage or decode failure.
    pub fn read(&self) -> Vec<String> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("History read failed: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("History is corrupted, ignoring it: {}", e);
                Vec::new()
            }
        }
    }

    /// Appends `entry` unless it equals the most recent one.
    pub fn write(&mut self, entry: &str) {
        let mut entries = self.read();
        if entries.last().is_some_and(|last| last == entry) {
            debug!("History: skipping adjacent duplicate");
            return;
        }
        entries.push(entry.to_string());
        if entries.len() > self.capacity {
            let overflow = entries.len() - self.capacity;
            entries.drain(..overflow);
        }

        let json = match serde_json::to_string(&entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("History encode failed: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &json) {
            warn!("History write failed: {}", e);
        }
    }
}

/// Position while browsing history with Up/Down.
///
/// `None` means the user is editing a fresh line (not browsing).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HistoryCursor {
    index: Option<usize>,
}

impl HistoryCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_browsing(&self) -> bool {
        self.index.is_some()
    }

    /// One step toward the oldest entry. Stops at the oldest.
    pub fn older(&mut self, entries: &[String]) -> Option<String> {
        if entries.is_empty() {
            return None;
        }
        let next = match self.index {
            Some(i) => i.saturating_sub(1),
            None => entries.len() - 1,
        };
        self.index = Some(next);
        entries.get(next).cloned()
    }

    /// One step toward the newest entry. Past the newest, returns an
    /// empty line and stops browsing.
    pub fn newer(&mut self, entries: &[String]) -> Option<String> {
        match self.index {
            Some(i) if i + 1 < entries.len() => {
                self.index = Some(i + 1);
                entries.get(i + 1).cloned()
            }
            Some(_) => {
                self.index = None;
                Some(String::new())
            }
            None => None,
        }
    }

    pub fn reset(&mut self) {
        self.index = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStorage;

    impl SessionStorage for BrokenStorage {
        fn get(&self, _key: &str) -> io::Result<Option<String>> {
            Err(io::Error::other("storage unavailable"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
            Err(io::Error::other("storage unavailable"))
        }
    }

    #[test]
    fn test_adjacent_duplicates_stored_once() {
        let mut store = HistoryStore::in_memory();
        store.write("hello");
        store.write("hello");
        assert_eq!(store.read(), vec!["hello"]);
    }

    #[test]
    fn test_only_adjacent_duplicates_suppressed() {
        let mut store = HistoryStore::in_memory();
        store.write("a");
        store.write("b");
        store.write("a");
        assert_eq!(store.read(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut store = HistoryStore::in_memory();
        for i in 0..51 {
            store.write(&format!("entry {i}"));
        }
        let entries = store.read();
        assert_eq!(entries.len(), HISTORY_CAPACITY);
        assert_eq!(entries.first().unwrap(), "entry 1");
        assert_eq!(entries.last().unwrap(), "entry 50");
    }

    #[test]
    fn test_corrupted_storage_reads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, "{not json").unwrap();
        let store = HistoryStore::new(Box::new(storage));
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_corrupted_storage_is_overwritten_on_write() {
        let mut storage = MemoryStorage::new();
        storage.set(HISTORY_KEY, "42").unwrap();
        let mut store = HistoryStore::new(Box::new(storage));
        store.write("fresh");
        assert_eq!(store.read(), vec!["fresh"]);
    }

    #[test]
    fn test_storage_failures_degrade_silently() {
        let mut store = HistoryStore::new(Box::new(BrokenStorage));
        store.write("lost");
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HistoryStore::new(Box::new(FileStorage::new(dir.path().join("session"))));
        store.write("persisted");

        let reopened = HistoryStore::new(Box::new(FileStorage::new(dir.path().join("session"))));
        assert_eq!(reopened.read(), vec!["persisted"]);
        assert!(!dir.path().join("session").join(format!("{HISTORY_KEY}.tmp")).exists());
    }

    #[test]
    fn test_file_storage_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf());
        assert_eq!(storage.get("absent").unwrap(), None);
    }

    #[test]
    fn test_cursor_walks_back_and_stops_at_oldest() {
        let entries = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        let mut cursor = HistoryCursor::new();
        assert_eq!(cursor.older(&entries).as_deref(), Some("three"));
        assert_eq!(cursor.older(&entries).as_deref(), Some("two"));
        assert_eq!(cursor.older(&entries).as_deref(), Some("one"));
        assert_eq!(cursor.older(&entries).as_deref(), Some("one"));
    }

    #[test]
    fn test_cursor_forward_returns_to_empty() {
        let entries = vec!["one".to_string(), "two".to_string()];
        let mut cursor = HistoryCursor::new();
        cursor.older(&entries);
        cursor.older(&entries);
        assert_eq!(cursor.newer(&entries).as_deref(), Some("two"));
        assert_eq!(cursor.newer(&entries).as_deref(), Some(""));
        assert!(!cursor.is_browsing());
        assert_eq!(cursor.newer(&entries), None);
    }

    #[test]
    fn test_cursor_empty_history() {
        let mut cursor = HistoryCursor::new();
        assert_eq!(cursor.older(&[]), None);
        assert!(!cursor.is_browsing());
    }
}
