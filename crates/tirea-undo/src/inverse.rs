//! Undo synthesis for `set` operations.
//!
//! The undo for a `set` is decided from a probe taken before the set runs:
//! restore the previous value when the target existed, otherwise delete the
//! shallowest node the set is about to create.

use crate::probe::{Anchor, Outcome, Probe};
use crate::value::deep_equal;
use crate::Op;
use serde_json::Value;

/// Whether setting `value` at the probed path would change nothing.
pub fn is_noop(probe: &Probe<'_>, value: &Value) -> bool {
    probe
        .value()
        .is_some_and(|current| deep_equal(current, value))
}

/// Build the operation that reverses a `set` at the probed path.
///
/// Must be called before the set is applied; captured values are deep
/// copies. Filter segments are addressed by the index of the element they
/// matched, so the undo does not depend on the element still matching.
///
/// # Examples
///
/// ```
/// use tirea_undo::{parse_path, probe, synthesize, Op};
/// use serde_json::json;
///
/// let doc = json!({"user": {}});
/// let undo = synthesize(&probe(&doc, &parse_path("user.profile.active")));
/// assert_eq!(undo, Op::delete("user.profile"));
///
/// let doc = json!({"config": {"valid": true}});
/// let undo = synthesize(&probe(&doc, &parse_path("config.valid")));
/// assert_eq!(undo, Op::set("config.valid", true));
/// ```
pub fn synthesize(probe: &Probe<'_>) -> Op {
    let resolved = probe.resolved().clone();
    match probe.outcome() {
        Outcome::Found(previous) => Op::set(resolved, (*previous).clone()),
        Outcome::Missing {
            anchor: Anchor::Absent(created),
            ..
        } => {
            let mut target = resolved;
            target.push(created.clone());
            Op::delete(target)
        }
        Outcome::Missing {
            anchor: Anchor::Replaced(node),
            ..
        } => Op::set(resolved, (*node).clone()),
    }
}
