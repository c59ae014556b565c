//! Memoized path parsing.
//!
//! Stores tend to be driven with the same handful of path strings in hot
//! loops; parsing each once is enough. The cache is a bounded FIFO: at
//! capacity the earliest inserted entry is evicted.

use crate::{parse_path, Path};
use indexmap::IndexMap;
use tracing::trace;

/// Default number of distinct path strings kept.
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 1000;

/// Bounded FIFO cache of parsed paths, keyed by the raw path string.
#[derive(Debug, Clone)]
pub struct PathCache {
    capacity: usize,
    entries: IndexMap<String, Path>,
}

impl PathCache {
    /// Create a cache holding at most `capacity` paths. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: IndexMap::with_capacity(capacity.min(DEFAULT_PATH_CACHE_CAPACITY)),
        }
    }

    /// Parse `raw`, reusing an earlier parse of the same string.
    pub fn parse(&mut self, raw: &str) -> Path {
        if let Some(path) = self.entries.get(raw) {
            return path.clone();
        }

        let path = parse_path(raw);
        if self.capacity == 0 {
            return path;
        }
        if self.entries.len() >= self.capacity {
            if let Some((evicted, _)) = self.entries.shift_remove_index(0) {
                trace!(path = %evicted, "evicted cached path");
            }
        }
        self.entries.insert(raw.to_owned(), path.clone());
        path
    }

    /// Whether `raw` is currently cached.
    #[inline]
    pub fn contains(&self, raw: &str) -> bool {
        self.entries.contains_key(raw)
    }

    /// Number of cached paths.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of cached paths.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_CACHE_CAPACITY)
    }
}
