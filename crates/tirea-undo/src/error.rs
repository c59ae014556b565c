//! Error types for tirea-undo operations.
//!
//! Mutations on the store are infallible by contract; errors only surface
//! from strict path validation and from persistence adapters.

use thiserror::Error;

/// Result type alias for tirea-undo operations.
pub type UndoResult<T> = Result<T, UndoError>;

/// Errors that can occur outside the infallible mutation path.
#[derive(Debug, Error)]
pub enum UndoError {
    /// Path string contains a fragment the grammar cannot read.
    #[error("invalid path {path:?} at byte {offset}: {reason}")]
    InvalidPath {
        /// The rejected path string.
        path: String,
        /// Byte offset of the first malformed fragment.
        offset: usize,
        /// What was expected there.
        reason: &'static str,
    },

    /// Persistence key cannot be used by the adapter.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Adapter-specific storage failure.
    #[error("storage error: {message}")]
    Storage {
        /// Description of what went wrong.
        message: String,
    },

    /// Filesystem error from a file-backed adapter.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UndoError {
    /// Create an invalid path error.
    #[inline]
    pub fn invalid_path(path: impl Into<String>, offset: usize, reason: &'static str) -> Self {
        UndoError::InvalidPath {
            path: path.into(),
            offset,
            reason,
        }
    }

    /// Create a storage error.
    #[inline]
    pub fn storage(message: impl Into<String>) -> Self {
        UndoError::Storage {
            message: message.into(),
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
