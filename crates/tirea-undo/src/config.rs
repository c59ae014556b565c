//! Store configuration.

use crate::cache::DEFAULT_PATH_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};

/// Default capacity of the undo and redo stacks.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Default key the persisted snapshot is stored under.
pub const DEFAULT_PERSIST_KEY: &str = "tirea-undo";

/// Configuration for an [`UndoStore`](crate::UndoStore).
///
/// Missing fields fall back to their defaults when deserialized:
///
/// ```
/// use tirea_undo::StoreOptions;
///
/// let options: StoreOptions = serde_json::from_str(r#"{"max_history": 20}"#).unwrap();
/// assert_eq!(options.max_history, 20);
/// assert_eq!(options.persist_key, "tirea-undo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Capacity of each history stack; the oldest entry is evicted past it.
    pub max_history: usize,
    /// Number of distinct path strings whose parse is memoized.
    pub path_cache_capacity: usize,
    /// Adapter key for the persisted snapshot.
    pub persist_key: String,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
            persist_key: DEFAULT_PERSIST_KEY.to_string(),
        }
    }
}

impl StoreOptions {
    /// Set the history capacity (builder pattern).
    #[must_use]
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Set the path cache capacity (builder pattern).
    #[must_use]
    pub fn with_path_cache_capacity(mut self, capacity: usize) -> Self {
        self.path_cache_capacity = capacity;
        self
    }

    /// Set the persistence key (builder pattern).
    #[must_use]
    pub fn with_persist_key(mut self, key: impl Into<String>) -> Self {
        self.persist_key = key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::default();
        assert_eq!(options.max_history, 100);
        assert_eq!(options.path_cache_capacity, 1000);
        assert_eq!(options.persist_key, "tirea-undo");
    }

    #[test]
    fn test_builder() {
        let options = StoreOptions::default()
            .with_max_history(3)
            .with_path_cache_capacity(0)
            .with_persist_key("editor");
        assert_eq!(options.max_history, 3);
        assert_eq!(options.path_cache_capacity, 0);
        assert_eq!(options.persist_key, "editor");
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let options: StoreOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, StoreOptions::default());
    }
}
