//! Bounded recent-searches list

use serde::{Deserialize, Serialize};

/// Maximum number of remembered cities
pub const HISTORY_CAP: usize = 5;

/// Key under which the history is persisted
pub const HISTORY_KEY: &str = "searchHistory";

/// Distinct city names, most recent first, at most [`HISTORY_CAP`] long
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SearchHistory {
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `city` to the front, dropping any older copy and the overflow.
    pub fn push(&mut self, city: impl Into<String>) {
        let city = city.into();
        self.entries.retain(|c| *c != city);
        self.entries.insert(0, city);
        self.entries.truncate(HISTORY_CAP);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a persisted JSON array; anything malformed yields `None`.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str::<Self>(raw).ok()
    }

    pub fn to_json(&self) -> String {
        // a Vec<String> always serializes
        serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Stored lists may have been edited by hand; keep the first occurrence of
/// each city and at most the cap.
impl From<Vec<String>> for SearchHistory {
    fn from(stored: Vec<String>) -> Self {
        let mut entries: Vec<String> = Vec::with_capacity(HISTORY_CAP);
        for city in stored {
            if entries.len() == HISTORY_CAP {
                break;
            }
            if !entries.contains(&city) {
                entries.push(city);
            }
        }
        Self { entries }
    }
}

impl From<SearchHistory> for Vec<String> {
    fn from(history: SearchHistory) -> Self {
        history.entries
    }
}
