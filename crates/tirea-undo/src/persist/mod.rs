//! Snapshot persistence for [`UndoStore`](crate::UndoStore).
//!
//! An adapter is a plain string key/value store. The store writes its state
//! and both history stacks as one JSON document after every notification,
//! and reads it back once when persistence is enabled:
//!
//! ```json
//! {
//!   "state": {"count": 10},
//!   "undoStack": [{"undo": {"op": "set", "path": "count", "value": 5},
//!                  "redo": {"op": "set", "path": "count", "value": 10}}],
//!   "redoStack": []
//! }
//! ```

mod file;
mod memory;

pub use file::FileAdapter;
pub use memory::MemoryAdapter;

use crate::{HistoryEntry, UndoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;

/// String key/value storage used to persist store snapshots.
///
/// Implementations must be safe to share across threads; the store only
/// calls them synchronously from its own mutating methods.
pub trait PersistenceAdapter: Send + Sync {
    /// Read the value stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> UndoResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: String) -> UndoResult<()>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> UndoResult<()>;
}

/// Persisted form of a store: current state plus both history stacks,
/// oldest entry first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedHistory {
    pub state: Value,
    #[serde(default)]
    pub undo_stack: Vec<HistoryEntry>,
    #[serde(default)]
    pub redo_stack: Vec<HistoryEntry>,
}

impl PersistedHistory {
    /// Parse a snapshot previously written by a store.
    pub fn from_json(raw: &str) -> UndoResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Borrowed view used when writing, so snapshots never clone the tree.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SnapshotRef<'a> {
    pub state: &'a Value,
    pub undo_stack: &'a VecDeque<HistoryEntry>,
    pub redo_stack: &'a VecDeque<HistoryEntry>,
}

impl SnapshotRef<'_> {
    pub fn to_json(&self) -> UndoResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Op;
    use serde_json::json;

    #[test]
    fn test_snapshot_wire_format() {
        let state = json!({"count": 10});
        let undo_stack = VecDeque::from(vec![HistoryEntry {
            undo: Op::set("count", 5),
            redo: Op::set("count", 10),
        }]);
        let redo_stack = VecDeque::new();

        let raw = SnapshotRef {
            state: &state,
            undo_stack: &undo_stack,
            redo_stack: &redo_stack,
        }
        .to_json()
        .unwrap();

        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            json!({
                "state": {"count": 10},
                "undoStack": [{
                    "undo": {"op": "set", "path": "count", "value": 5},
                    "redo": {"op": "set", "path": "count", "value": 10}
                }],
                "redoStack": []
            })
        );

        let parsed = PersistedHistory::from_json(&raw).unwrap();
        assert_eq!(parsed.state, state);
        assert_eq!(parsed.undo_stack, Vec::from(undo_stack));
        assert!(parsed.redo_stack.is_empty());
    }

    #[test]
    fn test_missing_stacks_default_to_empty() {
        let parsed = PersistedHistory::from_json(r#"{"state": {"a": 1}}"#).unwrap();
        assert_eq!(parsed.state, json!({"a": 1}));
        assert!(parsed.undo_stack.is_empty());
        assert!(parsed.redo_stack.is_empty());
    }

    #[test]
    fn test_malformed_snapshot_is_serialization_error() {
        let err = PersistedHistory::from_json("{not json").unwrap_err();
        assert!(matches!(err, crate::UndoError::Serialization(_)));
    }
}
