//! Path-addressed JSON store with automatic undo/redo.
//!
//! `tirea-undo` applies mutations to a `serde_json::Value` document through
//! string paths and records, for each one, the operation that reverses it.
//!
//! # Core Concepts
//!
//! - **Path**: dot/bracket addressing: `user.name`, `items[0]`, `items[id:42]`
//! - **Probe**: read-only walk reporting whether a path exists and, if not,
//!   the shallowest segment a `set` would create
//! - **Op**: a serializable `set`, `delete`, or ordered `batch`
//! - **UndoStore**: owns the document and the bounded undo/redo stacks
//! - **PersistenceAdapter**: optional string key/value backend for snapshots
//!
//! # Inverse Correctness
//!
//! ```text
//! apply(apply(T, redo), undo) == T
//! ```
//!
//! A `set` whose target already holds a deep-equal value records nothing.
//!
//! # Quick Start
//!
//! ```
//! use tirea_undo::UndoStore;
//! use serde_json::json;
//!
//! let mut store = UndoStore::new(json!({"items": []}));
//!
//! store.set("items[id:1].name", "Apple");
//! assert_eq!(store.state(), &json!({"items": [{"id": 1, "name": "Apple"}]}));
//!
//! store.undo();
//! assert_eq!(store.state(), &json!({"items": []}));
//! ```
//!
//! # Working with operations directly
//!
//! ```
//! use tirea_undo::{apply_op, parse_path, probe, synthesize, Op};
//! use serde_json::json;
//!
//! let mut doc = json!({"config": {"valid": true}});
//! let path = parse_path("config.valid");
//! let undo = synthesize(&probe(&doc, &path));
//!
//! apply_op(&mut doc, &Op::set(path, false));
//! apply_op(&mut doc, &undo);
//! assert_eq!(doc, json!({"config": {"valid": true}}));
//! ```

mod apply;
mod cache;
mod config;
mod error;
mod history;
mod inverse;
mod op;
mod path;
mod persist;
mod probe;
mod value;

// Core types
pub use apply::{apply_op, apply_ops, MAX_ARRAY_PADDING};
pub use error::{value_type_name, UndoError, UndoResult};
pub use inverse::{is_noop, synthesize};
pub use op::Op;
pub use path::{parse_path, validate_path, Path, Seg};
pub use probe::{get_at_path, probe, Anchor, Outcome, Probe};
pub use value::{deep_equal, loose_equal};

// Store types
pub use cache::{PathCache, DEFAULT_PATH_CACHE_CAPACITY};
pub use config::{StoreOptions, DEFAULT_MAX_HISTORY, DEFAULT_PERSIST_KEY};
pub use history::{HistoryEntry, HistoryInfo, SubscriptionId, Transaction, UndoStore};
pub use persist::{FileAdapter, MemoryAdapter, PersistedHistory, PersistenceAdapter};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
