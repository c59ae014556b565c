//! The undo/redo store.
//!
//! [`UndoStore`] owns a document and records, for every mutation, the
//! operation that reverses it. Each mutating call produces one
//! [`HistoryEntry`] on the undo stack; batches collapse into a single entry.

use crate::cache::PathCache;
use crate::config::StoreOptions;
use crate::inverse::{is_noop, synthesize};
use crate::persist::{PersistedHistory, PersistenceAdapter, SnapshotRef};
use crate::probe::probe;
use crate::{apply_op, get_at_path, parse_path, Op, Path, UndoResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Paired operations for one logical user action.
///
/// Applying `redo` and then `undo` restores the document exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub undo: Op,
    pub redo: Op,
}

/// Stack depths passed to listeners and returned by [`UndoStore::history`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryInfo {
    pub undo: usize,
    pub redo: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Handle returned by [`UndoStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Value, HistoryInfo) + Send>;

/// A document with bounded undo/redo history.
///
/// # Examples
///
/// ```
/// use tirea_undo::UndoStore;
/// use serde_json::json;
///
/// let mut store = UndoStore::new(json!({"user": {}}));
/// store.set("user.profile.active", true);
/// assert_eq!(store.state(), &json!({"user": {"profile": {"active": true}}}));
///
/// assert!(store.undo());
/// assert_eq!(store.state(), &json!({"user": {}}));
///
/// assert!(store.redo());
/// assert_eq!(store.get("user.profile.active"), Some(&json!(true)));
/// ```
pub struct UndoStore {
    state: Value,
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    options: StoreOptions,
    paths: PathCache,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    persistence: Option<Arc<dyn PersistenceAdapter>>,
}

impl Default for UndoStore {
    fn default() -> Self {
        Self::new(Value::Object(Default::default()))
    }
}

impl fmt::Debug for UndoStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoStore")
            .field("state", &self.state)
            .field("history", &self.history())
            .field("options", &self.options)
            .field("listeners", &self.listeners.len())
            .field("persistent", &self.persistence.is_some())
            .finish()
    }
}

impl UndoStore {
    /// Create a store over `initial` with default options.
    pub fn new(initial: Value) -> Self {
        Self::with_options(initial, StoreOptions::default())
    }

    /// Create a store over `initial` with the given options.
    pub fn with_options(initial: Value, options: StoreOptions) -> Self {
        Self {
            state: initial,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            paths: PathCache::new(options.path_cache_capacity),
            options,
            listeners: Vec::new(),
            next_subscription: 0,
            persistence: None,
        }
    }

    /// Set `value` at `path`, recording its inverse.
    ///
    /// Returns `false` when the value already at `path` is deep-equal to
    /// `value`; nothing is recorded and no listener runs.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> bool {
        let path = self.paths.parse(path);
        match record(&mut self.state, path, value.into()) {
            Some(entry) => {
                self.commit(entry);
                true
            }
            None => false,
        }
    }

    /// Like [`set`](Self::set), returning the recorded entry.
    pub fn set_tracked(&mut self, path: &str, value: impl Into<Value>) -> Option<HistoryEntry> {
        let path = self.paths.parse(path);
        let entry = record(&mut self.state, path, value.into())?;
        self.commit(entry.clone());
        Some(entry)
    }

    /// Run several sets as one history entry.
    ///
    /// The undo of the entry reverses the collected sets last-first. When
    /// every set inside was a no-op, nothing is recorded and no listener
    /// runs.
    ///
    /// ```
    /// use tirea_undo::UndoStore;
    /// use serde_json::json;
    ///
    /// let mut store = UndoStore::new(json!({"x": 1, "y": 2}));
    /// store.batch(|tx| {
    ///     tx.set("x", 10).set("y", 20);
    /// });
    /// assert_eq!(store.history().undo, 1);
    ///
    /// store.undo();
    /// assert_eq!(store.state(), &json!({"x": 1, "y": 2}));
    /// ```
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Transaction<'_>) -> R) -> R {
        let mut tx = Transaction {
            state: &mut self.state,
            paths: &mut self.paths,
            entries: Vec::new(),
        };
        let result = f(&mut tx);
        let entries = tx.entries;

        if entries.is_empty() {
            trace!("batch recorded no changes");
            return result;
        }

        let count = entries.len();
        let (mut undos, redos): (Vec<Op>, Vec<Op>) = entries
            .into_iter()
            .map(|entry| (entry.undo, entry.redo))
            .unzip();
        undos.reverse();
        debug!(ops = count, "batch committed");
        self.commit(HistoryEntry {
            undo: Op::batch(undos),
            redo: Op::batch(redos),
        });
        result
    }

    /// Revert the most recent entry. Returns `false` if there is none.
    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        apply_op(&mut self.state, &entry.undo);
        debug!(op = entry.undo.name(), undo = self.undo_stack.len(), "undo");
        push_bounded(&mut self.redo_stack, entry, self.options.max_history);
        self.notify();
        true
    }

    /// Reapply the most recently undone entry. Returns `false` if there is none.
    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.redo_stack.pop_back() else {
            return false;
        };
        apply_op(&mut self.state, &entry.redo);
        debug!(op = entry.redo.name(), redo = self.redo_stack.len(), "redo");
        push_bounded(&mut self.undo_stack, entry, self.options.max_history);
        self.notify();
        true
    }

    /// Drop both stacks. The document is left untouched.
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        debug!("history cleared");
        self.notify();
    }

    /// The current document.
    ///
    /// Mutating a copy of it is fine; mutations only enter history through
    /// the store.
    #[inline]
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// Read the value at `path`, if it exists.
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_at_path(&self.state, &parse_path(path))
    }

    /// Current stack depths.
    pub fn history(&self) -> HistoryInfo {
        HistoryInfo {
            undo: self.undo_stack.len(),
            redo: self.redo_stack.len(),
            can_undo: !self.undo_stack.is_empty(),
            can_redo: !self.redo_stack.is_empty(),
        }
    }

    /// Recorded entries, oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo_stack.iter()
    }

    /// Undone entries, oldest first; the last one is redone next.
    pub fn redo_entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.redo_stack.iter()
    }

    /// Options this store was built with.
    #[inline]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Register a listener called after every completed mutating call, in
    /// subscription order.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Value, HistoryInfo) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Attach a persistence adapter.
    ///
    /// A snapshot already stored under the configured key replaces the
    /// current document and history, and listeners are notified. From then
    /// on every notification writes a fresh snapshot. Storage failures are
    /// logged and never surface here.
    pub fn enable_persistence(&mut self, adapter: Arc<dyn PersistenceAdapter>) {
        let key = self.options.persist_key.clone();
        let restored = match adapter.get(&key) {
            Ok(Some(raw)) => match PersistedHistory::from_json(&raw) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    warn!(key = %key, error = %e, "discarding unreadable persisted history");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to load persisted history");
                None
            }
        };

        self.persistence = Some(adapter);
        if let Some(snapshot) = restored {
            self.restore(snapshot);
            debug!(
                key = %key,
                undo = self.undo_stack.len(),
                redo = self.redo_stack.len(),
                "restored persisted history"
            );
            self.notify();
        }
    }

    /// Detach the persistence adapter, returning it.
    pub fn disable_persistence(&mut self) -> Option<Arc<dyn PersistenceAdapter>> {
        self.persistence.take()
    }

    /// Whether a persistence adapter is attached.
    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Remove the stored snapshot from the attached adapter, if any.
    pub fn purge_persisted(&self) -> UndoResult<()> {
        match &self.persistence {
            Some(adapter) => adapter.remove(&self.options.persist_key),
            None => Ok(()),
        }
    }

    fn commit(&mut self, entry: HistoryEntry) {
        debug!(
            op = entry.redo.name(),
            path = ?entry.redo.path().map(ToString::to_string),
            "recorded history entry"
        );
        push_bounded(&mut self.undo_stack, entry, self.options.max_history);
        self.redo_stack.clear();
        self.notify();
    }

    fn restore(&mut self, snapshot: PersistedHistory) {
        let max = self.options.max_history;
        self.state = snapshot.state;
        self.undo_stack = truncated(snapshot.undo_stack, max);
        self.redo_stack = truncated(snapshot.redo_stack, max);
    }

    fn notify(&mut self) {
        let info = self.history();
        for (_, listener) in &mut self.listeners {
            listener(&self.state, info);
        }
        self.persist();
    }

    fn persist(&self) {
        let Some(adapter) = &self.persistence else {
            return;
        };
        let snapshot = SnapshotRef {
            state: &self.state,
            undo_stack: &self.undo_stack,
            redo_stack: &self.redo_stack,
        };
        let key = &self.options.persist_key;
        if let Err(e) = snapshot.to_json().and_then(|raw| adapter.put(key, raw)) {
            warn!(key = %key, error = %e, "failed to persist history");
        }
    }
}

/// Collects sets inside [`UndoStore::batch`].
///
/// Each set is applied immediately, so later sets and [`get`](Self::get)
/// observe earlier ones.
pub struct Transaction<'s> {
    state: &'s mut Value,
    paths: &'s mut PathCache,
    entries: Vec<HistoryEntry>,
}

impl Transaction<'_> {
    /// Set `value` at `path`. No-ops are skipped.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        let path = self.paths.parse(path);
        if let Some(entry) = record(&mut *self.state, path, value.into()) {
            self.entries.push(entry);
        }
        self
    }

    /// Read the value at `path` as of the sets applied so far.
    pub fn get(&self, path: &str) -> Option<&Value> {
        get_at_path(&*self.state, &parse_path(path))
    }

    /// Number of sets recorded so far (no-ops excluded).
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Apply `Set(path, value)` to `state` and return it with its inverse, or
/// `None` when the value is already there.
fn record(state: &mut Value, path: Path, value: Value) -> Option<HistoryEntry> {
    let probed = probe(state, &path);
    if is_noop(&probed, &value) {
        trace!(path = %path, "skipping set of identical value");
        return None;
    }
    let undo = synthesize(&probed);
    let redo = Op::Set { path, value };
    apply_op(state, &redo);
    Some(HistoryEntry { undo, redo })
}

fn push_bounded(stack: &mut VecDeque<HistoryEntry>, entry: HistoryEntry, max: usize) {
    if max == 0 {
        return;
    }
    while stack.len() >= max {
        stack.pop_front();
    }
    stack.push_back(entry);
}

fn truncated(entries: Vec<HistoryEntry>, max: usize) -> VecDeque<HistoryEntry> {
    let skip = entries.len().saturating_sub(max);
    entries.into_iter().skip(skip).collect()
}
