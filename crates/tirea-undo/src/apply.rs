//! Operation application logic.
//!
//! Application is in place and never fails: a `delete` of a missing path is
//! a no-op, and a `set` creates (or replaces) whatever containers its path
//! needs.

use crate::error::value_type_name;
use crate::probe::find_match;
use crate::{Op, Path, Seg};
use serde_json::{Map, Value};
use tracing::{debug, trace};

/// Apply a single operation to a document (mutating).
///
/// # Examples
///
/// ```
/// use tirea_undo::{apply_op, Op};
/// use serde_json::json;
///
/// let mut doc = json!({"items": []});
/// apply_op(&mut doc, &Op::set("items[id:1].name", "Apple"));
/// assert_eq!(doc, json!({"items": [{"id": 1, "name": "Apple"}]}));
///
/// apply_op(&mut doc, &Op::delete("items[id:1]"));
/// assert_eq!(doc, json!({"items": []}));
/// ```
pub fn apply_op(doc: &mut Value, op: &Op) {
    match op {
        Op::Set { path, value } => apply_set(doc, path, value.clone()),
        Op::Delete { path } => apply_delete(doc, path),
        Op::Batch { ops } => {
            for op in ops {
                apply_op(doc, op);
            }
        }
    }
}

/// Apply operations to a copy of a document (pure function).
///
/// ```
/// use tirea_undo::{apply_ops, Op};
/// use serde_json::json;
///
/// let doc = json!({"count": 0});
/// let next = apply_ops(&doc, &[Op::set("count", 10), Op::set("name", "test")]);
/// assert_eq!(next, json!({"count": 10, "name": "test"}));
/// assert_eq!(doc["count"], 0);
/// ```
pub fn apply_ops(doc: &Value, ops: &[Op]) -> Value {
    let mut result = doc.clone();
    for op in ops {
        apply_op(&mut result, op);
    }
    result
}

/// Apply a Set operation. An empty path replaces the whole document.
fn apply_set(doc: &mut Value, path: &Path, value: Value) {
    let Some((last, parents)) = path.segments().split_last() else {
        *doc = value;
        return;
    };

    let mut current = doc;
    for seg in parents {
        current = child_or_create(current, seg);
    }
    write_slot(current, last, value);
}

/// Descend one segment, materializing whatever the segment needs.
fn child_or_create<'a>(node: &'a mut Value, seg: &Seg) -> &'a mut Value {
    match seg {
        Seg::Key(key) => ensure_object(node)
            .entry(key.clone())
            .or_insert(Value::Null),
        Seg::Index(idx) => index_slot(node, *idx),
        Seg::Filter { field, value } => {
            let items = ensure_array(node);
            let pos = find_or_seed(items, field, value);
            &mut items[pos]
        }
    }
}

/// Overwrite (or, for filters, merge into) the slot addressed by `seg`.
fn write_slot(node: &mut Value, seg: &Seg, value: Value) {
    match seg {
        Seg::Key(key) => {
            ensure_object(node).insert(key.clone(), value);
        }
        Seg::Index(idx) => *index_slot(node, *idx) = value,
        Seg::Filter {
            field,
            value: selector,
        } => {
            let items = ensure_array(node);
            let pos = find_or_seed(items, field, selector);
            match (value, &mut items[pos]) {
                (Value::Object(fields), Value::Object(element)) => {
                    for (k, v) in fields {
                        element.insert(k, v);
                    }
                }
                (value, _) => {
                    // A non-object value cannot be merged into the element; it is kept as-is.
                    debug!(
                        field = %field,
                        value_type = value_type_name(&value),
                        "filter set with non-object value leaves element unchanged"
                    );
                }
            }
        }
    }
}

/// Most nulls a single index set may pad an array with.
pub const MAX_ARRAY_PADDING: usize = 10_000;

/// Slot for an index: array positions (padding with nulls past the end), or
/// the decimal key on anything else.
///
/// An index further than [`MAX_ARRAY_PADDING`] past the end replaces the
/// array with a map keyed by the decimal index.
fn index_slot(node: &mut Value, idx: usize) -> &mut Value {
    let fits = matches!(&*node, Value::Array(items) if within_padding(items.len(), idx));
    if fits {
        let Value::Array(items) = node else {
            unreachable!("fits implies array")
        };
        if idx >= items.len() {
            if idx > items.len() {
                debug!(index = idx, len = items.len(), "padding array with nulls");
            }
            items.resize(idx + 1, Value::Null);
        }
        &mut items[idx]
    } else {
        if node.is_array() {
            debug!(index = idx, "index too far past array end, using map key");
        }
        ensure_object(node)
            .entry(idx.to_string())
            .or_insert(Value::Null)
    }
}

/// Whether writing at `idx` pads an array of `len` by at most
/// [`MAX_ARRAY_PADDING`] nulls.
fn within_padding(len: usize, idx: usize) -> bool {
    idx.checked_sub(len)
        .map_or(true, |padding| padding <= MAX_ARRAY_PADDING)
}

/// Position of the element matching the selector, appending `{field: value}`
/// when none does.
fn find_or_seed(items: &mut Vec<Value>, field: &str, value: &Value) -> usize {
    if let Some(pos) = find_match(items, field, value) {
        return pos;
    }
    let mut seed = Map::new();
    seed.insert(field.to_owned(), value.clone());
    items.push(Value::Object(seed));
    items.len() - 1
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(obj) => obj,
        _ => unreachable!("node was just replaced with an object"),
    }
}

fn ensure_array(node: &mut Value) -> &mut Vec<Value> {
    if !node.is_array() {
        *node = Value::Array(Vec::new());
    }
    match node {
        Value::Array(items) => items,
        _ => unreachable!("node was just replaced with an array"),
    }
}

/// Apply a Delete operation (no-op if path doesn't exist).
fn apply_delete(doc: &mut Value, path: &Path) {
    let Some((last, parents)) = path.segments().split_last() else {
        return;
    };

    let mut current = doc;
    for seg in parents {
        match existing_child(current, seg) {
            Some(child) => current = child,
            None => return,
        }
    }
    if !remove_entry(current, last) {
        trace!(path = %path, "delete target not found");
    }
}

fn existing_child<'a>(node: &'a mut Value, seg: &Seg) -> Option<&'a mut Value> {
    match (seg, node) {
        (Seg::Key(key), Value::Object(obj)) => obj.get_mut(key),
        (Seg::Index(idx), Value::Array(items)) => items.get_mut(*idx),
        (Seg::Filter { field, value }, Value::Array(items)) => {
            let pos = find_match(items, field, value)?;
            items.get_mut(pos)
        }
        _ => None,
    }
}

/// Remove the entry addressed by `seg`. Returns true if something was removed.
fn remove_entry(node: &mut Value, seg: &Seg) -> bool {
    match (seg, node) {
        (Seg::Key(key), Value::Object(obj)) => obj.remove(key).is_some(),
        (Seg::Index(idx), Value::Array(items)) if *idx < items.len() => {
            items.remove(*idx);
            true
        }
        (Seg::Filter { field, value }, Value::Array(items)) => {
            match find_match(items, field, value) {
                Some(pos) => {
                    items.remove(pos);
                    true
                }
                None => false,
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn applied(doc: Value, op: Op) -> Value {
        let mut doc = doc;
        apply_op(&mut doc, &op);
        doc
    }

    #[test]
    fn test_apply_set() {
        let result = applied(json!({}), Op::set("name", "Alice"));
        assert_eq!(result, json!({"name": "Alice"}));
    }

    #[test]
    fn test_apply_set_creates_intermediate_objects() {
        let result = applied(json!({}), Op::set("a.b.c", 42));
        assert_eq!(result, json!({"a": {"b": {"c": 42}}}));
    }

    #[test]
    fn test_apply_set_replaces_scalar_intermediate() {
        let result = applied(json!({"a": 5}), Op::set("a.b", 1));
        assert_eq!(result, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_apply_set_root_replaces_document() {
        let result = applied(json!({"a": 1}), Op::set("", json!({"b": 2})));
        assert_eq!(result, json!({"b": 2}));
    }

    #[test]
    fn test_apply_set_index() {
        let result = applied(json!({"arr": [1, 2, 3]}), Op::set("arr[1]", 20));
        assert_eq!(result, json!({"arr": [1, 20, 3]}));

        let result = applied(json!({"arr": [1]}), Op::set("arr[1]", 2));
        assert_eq!(result, json!({"arr": [1, 2]}));
    }

    #[test]
    fn test_apply_set_index_pads_with_nulls() {
        let result = applied(json!({"arr": [1]}), Op::set("arr[3]", 4));
        assert_eq!(result, json!({"arr": [1, null, null, 4]}));
    }

    #[test]
    fn test_apply_set_index_padding_is_bounded() {
        let result = applied(json!({"a": []}), Op::set("a[18446744073709551615]", 1));
        assert_eq!(result, json!({"a": {"18446744073709551615": 1}}));

        let result = applied(json!({"a": [1]}), Op::set("a[1000000000].b", 2));
        assert_eq!(result, json!({"a": {"1000000000": {"b": 2}}}));

        let furthest = Path::root().key("a").index(MAX_ARRAY_PADDING + 1);
        let result = applied(json!({"a": [1]}), Op::set(furthest, 2));
        let items = result["a"].as_array().unwrap();
        assert_eq!(items.len(), MAX_ARRAY_PADDING + 2);
        assert_eq!(items[MAX_ARRAY_PADDING + 1], json!(2));
    }

    #[test]
    fn test_apply_set_index_on_missing_creates_map() {
        let result = applied(json!({}), Op::set("list[0].name", "x"));
        assert_eq!(result, json!({"list": {"0": {"name": "x"}}}));
    }

    #[test]
    fn test_apply_set_filter_creates_seeded_element() {
        let result = applied(json!({"items": []}), Op::set("items[id:1].name", "Apple"));
        assert_eq!(result, json!({"items": [{"id": 1, "name": "Apple"}]}));
    }

    #[test]
    fn test_apply_set_filter_on_missing_container_creates_array() {
        let result = applied(json!({}), Op::set("items[sku:'a'].qty", 2));
        assert_eq!(result, json!({"items": [{"sku": "a", "qty": 2}]}));
    }

    #[test]
    fn test_apply_set_filter_merges_object_value() {
        let doc = json!({"items": [{"id": 1, "name": "A", "qty": 1}]});
        let result = applied(doc, Op::set("items[id:1]", json!({"qty": 5, "tag": "x"})));
        assert_eq!(
            result,
            json!({"items": [{"id": 1, "name": "A", "qty": 5, "tag": "x"}]})
        );
    }

    #[test]
    fn test_apply_set_filter_scalar_value_is_discarded() {
        let doc = json!({"items": [{"id": 1, "name": "A"}]});
        let result = applied(doc.clone(), Op::set("items[id:1]", 42));
        assert_eq!(result, doc);

        let result = applied(json!({"items": []}), Op::set("items[id:2]", "x"));
        assert_eq!(result, json!({"items": [{"id": 2}]}));
    }

    #[test]
    fn test_apply_delete_noop() {
        let result = applied(json!({"x": 1}), Op::delete("nonexistent.deep"));
        assert_eq!(result, json!({"x": 1}));

        let result = applied(json!({"x": 1}), Op::delete(""));
        assert_eq!(result, json!({"x": 1}));
    }

    #[test]
    fn test_apply_delete_existing() {
        let result = applied(json!({"x": 1, "y": 2}), Op::delete("x"));
        assert_eq!(result, json!({"y": 2}));
    }

    #[test]
    fn test_apply_delete_index_shifts() {
        let result = applied(json!({"arr": [1, 2, 3]}), Op::delete("arr[0]"));
        assert_eq!(result, json!({"arr": [2, 3]}));

        let result = applied(json!({"arr": [1]}), Op::delete("arr[4]"));
        assert_eq!(result, json!({"arr": [1]}));
    }

    #[test]
    fn test_apply_delete_filter() {
        let doc = json!({"items": [{"id": 1}, {"id": 2}, {"id": 3}]});
        let result = applied(doc, Op::delete("items[id:'2']"));
        assert_eq!(result, json!({"items": [{"id": 1}, {"id": 3}]}));
    }

    #[test]
    fn test_apply_delete_type_mismatch_is_noop() {
        let doc = json!({"obj": {"0": "zero"}, "n": 5});
        let result = applied(doc.clone(), Op::delete("obj[0]"));
        assert_eq!(result, doc);
        let result = applied(doc.clone(), Op::delete("n.x"));
        assert_eq!(result, doc);
    }

    #[test]
    fn test_apply_batch_in_order() {
        let result = applied(
            json!({}),
            Op::batch(vec![
                Op::set("x", 1),
                Op::set("x", 2),
                Op::set("y", json!({"z": 3})),
                Op::delete("y.z"),
            ]),
        );
        assert_eq!(result, json!({"x": 2, "y": {}}));
    }
}
