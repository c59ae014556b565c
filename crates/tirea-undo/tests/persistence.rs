//! Persistence adapters wired into `UndoStore`.

use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tirea_undo::{
    FileAdapter, MemoryAdapter, PersistedHistory, PersistenceAdapter, StoreOptions, UndoError,
    UndoResult, UndoStore,
};

fn stored(adapter: &dyn PersistenceAdapter, key: &str) -> PersistedHistory {
    let raw = adapter.get(key).unwrap().expect("snapshot written");
    PersistedHistory::from_json(&raw).unwrap()
}

/// Adapter whose writes always fail.
struct FailingAdapter;

impl PersistenceAdapter for FailingAdapter {
    fn get(&self, _key: &str) -> UndoResult<Option<String>> {
        Err(UndoError::storage("unavailable"))
    }

    fn put(&self, _key: &str, _value: String) -> UndoResult<()> {
        Err(UndoError::storage("unavailable"))
    }

    fn remove(&self, _key: &str) -> UndoResult<()> {
        Err(UndoError::storage("unavailable"))
    }
}

// ============================================================================
// Memory adapter
// ============================================================================

#[test]
fn test_every_notification_writes_snapshot() {
    let adapter = Arc::new(MemoryAdapter::new());
    let mut store = UndoStore::new(json!({"count": 5}));
    store.enable_persistence(adapter.clone());
    assert!(adapter.is_empty());

    store.set("count", 10);
    let snapshot = stored(adapter.as_ref(), "tirea-undo");
    assert_eq!(snapshot.state, json!({"count": 10}));
    assert_eq!(snapshot.undo_stack.len(), 1);
    assert!(snapshot.redo_stack.is_empty());

    store.undo();
    let snapshot = stored(adapter.as_ref(), "tirea-undo");
    assert_eq!(snapshot.state, json!({"count": 5}));
    assert!(snapshot.undo_stack.is_empty());
    assert_eq!(snapshot.redo_stack.len(), 1);
}

#[test]
fn test_wire_format_uses_camel_case_stacks() {
    let adapter = Arc::new(MemoryAdapter::new());
    let mut store = UndoStore::new(json!({"user": {}}));
    store.enable_persistence(adapter.clone());
    store.set("user.name", "Ada");

    let raw = adapter.get("tirea-undo").unwrap().unwrap();
    let value: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        json!({
            "state": {"user": {"name": "Ada"}},
            "undoStack": [{
                "undo": {"op": "delete", "path": "user.name"},
                "redo": {"op": "set", "path": "user.name", "value": "Ada"}
            }],
            "redoStack": []
        })
    );
}

#[test]
fn test_hydration_restores_state_and_history() {
    let adapter = Arc::new(MemoryAdapter::new());
    {
        let mut store = UndoStore::new(json!({}));
        store.enable_persistence(adapter.clone());
        store.set("a", 1);
        store.set("b", 2);
        store.undo();
    }

    let mut store = UndoStore::new(json!({"ignored": true}));
    let calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&calls);
    store.subscribe(move |_, _| *counter.lock().unwrap() += 1);

    store.enable_persistence(adapter.clone());
    assert_eq!(*calls.lock().unwrap(), 1);
    assert_eq!(store.state(), &json!({"a": 1}));
    assert_eq!(store.history().undo, 1);
    assert_eq!(store.history().redo, 1);

    assert!(store.redo());
    assert_eq!(store.state(), &json!({"a": 1, "b": 2}));
    assert!(store.undo());
    assert!(store.undo());
    assert_eq!(store.state(), &json!({}));
}

#[test]
fn test_hydration_truncates_to_capacity() {
    let adapter = Arc::new(MemoryAdapter::new());
    {
        let mut store = UndoStore::new(json!({}));
        store.enable_persistence(adapter.clone());
        for i in 0..5 {
            store.set("n", i);
        }
    }

    let options = StoreOptions::default().with_max_history(2);
    let mut store = UndoStore::with_options(json!({}), options);
    store.enable_persistence(adapter);
    assert_eq!(store.history().undo, 2);
    store.undo();
    store.undo();
    assert_eq!(store.get("n"), Some(&json!(2)));
}

#[test]
fn test_unreadable_snapshot_is_ignored() {
    let adapter = Arc::new(MemoryAdapter::new());
    adapter.put("tirea-undo", "not json".to_string()).unwrap();

    let mut store = UndoStore::new(json!({"keep": 1}));
    store.enable_persistence(adapter.clone());
    assert_eq!(store.state(), &json!({"keep": 1}));

    // The next write replaces the corrupt snapshot.
    store.set("keep", 2);
    assert_eq!(stored(adapter.as_ref(), "tirea-undo").state, json!({"keep": 2}));
}

#[test]
fn test_storage_failures_do_not_affect_store() {
    let mut store = UndoStore::new(json!({"a": 1}));
    store.enable_persistence(Arc::new(FailingAdapter));
    assert!(store.set("a", 2));
    assert!(store.undo());
    assert_eq!(store.state(), &json!({"a": 1}));
    assert!(store.purge_persisted().is_err());
}

#[test]
fn test_disable_and_purge() {
    let adapter = Arc::new(MemoryAdapter::new());
    let options = StoreOptions::default().with_persist_key("editor");
    let mut store = UndoStore::with_options(json!({}), options);
    store.enable_persistence(adapter.clone());
    store.set("a", 1);
    assert!(adapter.get("editor").unwrap().is_some());

    store.purge_persisted().unwrap();
    assert!(adapter.get("editor").unwrap().is_none());

    assert!(store.disable_persistence().is_some());
    assert!(!store.is_persistent());
    store.set("a", 2);
    assert!(adapter.get("editor").unwrap().is_none());
    assert!(store.purge_persisted().is_ok());
}

// ============================================================================
// File adapter
// ============================================================================

#[test]
fn test_file_adapter_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = UndoStore::new(json!({"items": []}));
        store.enable_persistence(Arc::new(FileAdapter::new(dir.path())));
        store.set("items[id:1].name", "Apple");
    }
    assert!(dir.path().join("tirea-undo.json").exists());

    let mut store = UndoStore::new(json!({}));
    store.enable_persistence(Arc::new(FileAdapter::new(dir.path())));
    assert_eq!(store.state(), &json!({"items": [{"id": 1, "name": "Apple"}]}));

    assert!(store.undo());
    assert_eq!(store.state(), &json!({"items": []}));
}

#[test]
fn test_file_adapter_invalid_key_is_logged_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let options = StoreOptions::default().with_persist_key("../outside");
    let mut store = UndoStore::with_options(json!({}), options);
    store.enable_persistence(Arc::new(FileAdapter::new(dir.path())));

    assert!(store.set("a", 1));
    assert!(matches!(
        store.purge_persisted(),
        Err(UndoError::InvalidKey(_))
    ));
}
