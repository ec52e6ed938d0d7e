//! Recent city searches
//!
//! Keeps the last few distinct cities the user looked up, most recent first,
//! and persists them between sessions through [`HistoryStore`].

mod store;

pub use store::{HistoryStore, StoredHistory};

use serde::{Deserialize, Serialize};

/// Maximum number of cities remembered
pub const HISTORY_LIMIT: usize = 5;

/// Most-recent-first list of distinct city names, capped at [`HISTORY_LIMIT`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchHistory {
    cities: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a history from stored entries, dropping blanks and duplicates and
    /// enforcing the cap
    pub fn from_entries(entries: impl IntoIterator<Item = String>) -> Self {
        let mut cities: Vec<String> = Vec::new();
        for city in entries {
            if city.trim().is_empty() || cities.contains(&city) {
                continue;
            }
            cities.push(city);
            if cities.len() == HISTORY_LIMIT {
                break;
            }
        }
        Self { cities }
    }

    /// Records a searched city.
    ///
    /// A new, non-empty city is put at the front and the oldest entry falls off
    /// past the cap. A city already in the list stays where it is. Returns whether
    /// the history changed.
    pub fn record(&mut self, city: &str) -> bool {
        if city.is_empty() || self.cities.iter().any(|c| c == city) {
            return false;
        }
        self.cities.insert(0, city.to_string());
        self.cities.truncate(HISTORY_LIMIT);
        true
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.cities.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.cities.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}
