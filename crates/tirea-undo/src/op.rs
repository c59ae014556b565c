//! Operations that mutate a document.
//!
//! Each operation is either a single `set`/`delete` at a path, or an ordered
//! batch of operations applied as one unit.

use crate::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single mutation, or an ordered group of them.
///
/// Serialized with an `op` tag:
/// `{"op":"set","path":"a.b","value":1}`, `{"op":"delete","path":"a.b"}`,
/// `{"op":"batch","ops":[...]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Set a value at the path.
    ///
    /// Creates intermediate containers if they don't exist.
    Set {
        /// Target path.
        path: Path,
        /// Value to set.
        value: Value,
    },

    /// Delete the value at the path.
    ///
    /// No-op if the path doesn't exist.
    Delete {
        /// Target path.
        path: Path,
    },

    /// Apply each operation in order.
    Batch {
        /// Operations in application order.
        ops: Vec<Op>,
    },
}

impl Op {
    /// Create a Set operation.
    #[inline]
    pub fn set(path: impl Into<Path>, value: impl Into<Value>) -> Self {
        Op::Set {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    #[inline]
    pub fn delete(path: impl Into<Path>) -> Self {
        Op::Delete { path: path.into() }
    }

    /// Create a Batch operation.
    #[inline]
    pub fn batch(ops: Vec<Op>) -> Self {
        Op::Batch { ops }
    }

    /// Get the path this operation targets (`None` for batches).
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Op::Set { path, .. } | Op::Delete { path } => Some(path),
            Op::Batch { .. } => None,
        }
    }

    /// Get the operation name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Op::Set { .. } => "set",
            Op::Delete { .. } => "delete",
            Op::Batch { .. } => "batch",
        }
    }
}
