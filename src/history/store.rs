//! History persistence
//!
//! Stores the search history as a small JSON file so it survives restarts.
//! Weather data itself is never written to disk.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

use super::SearchHistory;

const HISTORY_FILE: &str = "history.json";

/// On-disk form of the history
#[derive(Debug, Serialize, Deserialize)]
pub struct StoredHistory {
    pub cities: SearchHistory,
    pub saved_at: DateTime<Utc>,
}

/// Reads and writes the history file
///
/// The file lives in an XDG-compliant data directory
/// (`~/.local/share/weatherdash/` on Linux).
#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    /// Creates a store in the platform data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "weatherdash")?;
        Some(Self {
            dir: project_dirs.data_dir().to_path_buf(),
        })
    }

    /// Creates a store in a specific directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    /// Writes the history, creating the directory if needed
    pub fn save(&self, history: &SearchHistory) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let stored = StoredHistory {
            cities: history.clone(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.path(), json)
    }

    /// Reads the history
    ///
    /// A missing or unparseable file yields an empty history.
    pub fn load(&self) -> SearchHistory {
        let content = match fs::read_to_string(self.path()) {
            Ok(content) => content,
            Err(_) => return SearchHistory::new(),
        };

        match serde_json::from_str::<StoredHistory>(&content) {
            Ok(stored) => SearchHistory::from_entries(stored.cities.iter().map(String::from)),
            Err(e) => {
                debug!(error = %e, "ignoring unreadable history file");
                SearchHistory::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (HistoryStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = HistoryStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    fn history_of(cities: &[&str]) -> SearchHistory {
        let mut history = SearchHistory::new();
        for city in cities.iter().rev() {
            history.record(city);
        }
        history
    }

    #[test]
    fn test_load_returns_empty_when_missing() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let (store, _temp_dir) = create_test_store();
        let history = history_of(&["Lima", "Oslo"]);

        store.save(&history).expect("Save should succeed");

        assert_eq!(store.load(), history);
    }

    #[test]
    fn test_save_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("data");
        let store = HistoryStore::with_dir(nested.clone());

        store.save(&history_of(&["Oslo"])).expect("Save should succeed");

        assert!(nested.join(HISTORY_FILE).exists(), "History file should exist");
    }

    #[test]
    fn test_saved_file_records_timestamp() {
        let (store, temp_dir) = create_test_store();
        let before = Utc::now();
        store.save(&history_of(&["Oslo"])).expect("Save should succeed");

        let content = fs::read_to_string(temp_dir.path().join(HISTORY_FILE)).unwrap();
        let stored: StoredHistory = serde_json::from_str(&content).unwrap();
        assert!(stored.saved_at >= before);
        assert!(content.contains("\"Oslo\""));
    }

    #[test]
    fn test_load_ignores_corrupt_file() {
        let (store, temp_dir) = create_test_store();
        fs::write(temp_dir.path().join(HISTORY_FILE), "{ not json").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_load_enforces_cap_on_hand_edited_file() {
        let (store, temp_dir) = create_test_store();
        fs::write(
            temp_dir.path().join(HISTORY_FILE),
            r#"{"cities":["A","B","C","D","E","F","G"],"saved_at":"2024-07-15T00:00:00Z"}"#,
        )
        .unwrap();

        let history = store.load();
        assert_eq!(history.len(), 5);
        assert_eq!(history.get(0), Some("A"));
    }

    #[test]
    fn test_overwrite_existing_history() {
        let (store, _temp_dir) = create_test_store();
        store.save(&history_of(&["Oslo"])).expect("First save should succeed");
        store
            .save(&history_of(&["Lima", "Oslo"]))
            .expect("Second save should succeed");

        assert_eq!(store.load().get(0), Some("Lima"));
    }

    #[test]
    fn test_new_uses_project_name() {
        if let Some(store) = HistoryStore::new() {
            assert!(store.dir.to_string_lossy().contains("weatherdash"));
        }
        // Passes if new() returns None (e.g., no home directory in CI)
    }
}
