//! Read-only path resolution.
//!
//! A probe walks a path against a document and reports whether the target
//! exists, its current value, and otherwise the first segment that failed to
//! resolve. Everything from that segment onward is what a `set` would create.

use crate::value::loose_equal;
use crate::{Path, Seg};
use serde_json::Value;

/// Outcome of walking a path against a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Probe<'a> {
    resolved: Path,
    outcome: Outcome<'a>,
}

/// Whether the walk reached the target.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<'a> {
    /// Every segment resolved to this value.
    Found(&'a Value),
    /// The segment at `index` did not resolve.
    Missing {
        /// Index of the shallowest segment that did not resolve.
        index: usize,
        /// Why it did not resolve.
        anchor: Anchor<'a>,
    },
}

/// Why resolution stopped at the missing segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor<'a> {
    /// The container has the right kind and simply lacks the entry.
    ///
    /// Holds the concrete segment a `set` will create there; a filter is
    /// rewritten to the index the new element will occupy.
    Absent(Seg),
    /// The node the segment was applied to will be overwritten by a `set`:
    /// it is null, of the wrong kind, or an index would need padding.
    Replaced(&'a Value),
}

impl<'a> Probe<'a> {
    /// Whether every segment resolved.
    #[inline]
    pub fn exists(&self) -> bool {
        matches!(self.outcome, Outcome::Found(_))
    }

    /// The value at the path, when it exists.
    #[inline]
    pub fn value(&self) -> Option<&'a Value> {
        match self.outcome {
            Outcome::Found(value) => Some(value),
            Outcome::Missing { .. } => None,
        }
    }

    /// Index of the shallowest segment that did not resolve.
    #[inline]
    pub fn missing_index(&self) -> Option<usize> {
        match self.outcome {
            Outcome::Found(_) => None,
            Outcome::Missing { index, .. } => Some(index),
        }
    }

    /// Why resolution stopped, when it did.
    #[inline]
    pub fn anchor(&self) -> Option<&Anchor<'a>> {
        match &self.outcome {
            Outcome::Found(_) => None,
            Outcome::Missing { anchor, .. } => Some(anchor),
        }
    }

    /// The segments that did resolve, with filters replaced by the index of
    /// the element they matched.
    #[inline]
    pub fn resolved(&self) -> &Path {
        &self.resolved
    }

    /// Found value, or where and why the walk stopped.
    #[inline]
    pub fn outcome(&self) -> &Outcome<'a> {
        &self.outcome
    }
}

/// Walk `path` against `doc` without modifying it.
///
/// # Examples
///
/// ```
/// use tirea_undo::{parse_path, probe};
/// use serde_json::json;
///
/// let doc = json!({"user": {}});
/// let result = probe(&doc, &parse_path("user.profile.active"));
/// assert!(!result.exists());
/// assert_eq!(result.missing_index(), Some(1));
/// ```
pub fn probe<'a>(doc: &'a Value, path: &Path) -> Probe<'a> {
    let mut current = doc;
    let mut resolved = Path::root();

    for (i, seg) in path.iter().enumerate() {
        match step(current, seg) {
            Step::Descend(next, concrete) => {
                current = next;
                resolved.push(concrete);
            }
            Step::Stop(anchor) => {
                return Probe {
                    resolved,
                    outcome: Outcome::Missing { index: i, anchor },
                };
            }
        }
    }

    Probe {
        resolved,
        outcome: Outcome::Found(current),
    }
}

/// Get a reference to a value at a path (for reading).
pub fn get_at_path<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    probe(doc, path).value()
}

enum Step<'a> {
    Descend(&'a Value, Seg),
    Stop(Anchor<'a>),
}

fn step<'a>(node: &'a Value, seg: &Seg) -> Step<'a> {
    match (seg, node) {
        (Seg::Key(key), Value::Object(obj)) => match obj.get(key) {
            Some(child) => Step::Descend(child, seg.clone()),
            None => Step::Stop(Anchor::Absent(seg.clone())),
        },
        (Seg::Index(idx), Value::Array(arr)) => match arr.get(*idx) {
            Some(child) => Step::Descend(child, seg.clone()),
            None if *idx == arr.len() => Step::Stop(Anchor::Absent(seg.clone())),
            None => Step::Stop(Anchor::Replaced(node)),
        },
        (Seg::Filter { field, value }, Value::Array(arr)) => match find_match(arr, field, value) {
            Some(pos) => Step::Descend(&arr[pos], Seg::Index(pos)),
            None => Step::Stop(Anchor::Absent(Seg::Index(arr.len()))),
        },
        _ => Step::Stop(Anchor::Replaced(node)),
    }
}

/// Position of the first element whose `field` loosely equals `value`.
pub(crate) fn find_match(items: &[Value], field: &str, value: &Value) -> Option<usize> {
    items.iter().position(|item| {
        item.get(field)
            .is_some_and(|candidate| loose_equal(candidate, value))
    })
}
