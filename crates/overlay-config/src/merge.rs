//! Overlaying a newly loaded tree onto the accumulated one.
//!
//! Precedence is fixed: the source loaded **earlier** outranks the source
//! loaded later. For every key of the incoming tree:
//!
//! | accumulated | incoming | result |
//! |-------------|----------|--------|
//! | absent      | anything | incoming subtree moved in as-is |
//! | leaf        | anything | accumulated kept, incoming discarded |
//! | map         | leaf     | accumulated kept, incoming discarded |
//! | map         | map      | recurse |
//!
//! Leaves are scalars and sequences alike; sequences are never merged
//! element-wise.

use crate::types::{Map, Node};

/// Merge `incoming` into `accumulated`.
///
/// Returns the dotted paths of incoming entries that were discarded because
/// an accumulated entry shadowed them.
pub fn merge(accumulated: &mut Map, incoming: Map) -> Vec<String> {
    let mut shadowed = Vec::new();
    let mut path = Vec::new();
    merge_at(accumulated, incoming, &mut path, &mut shadowed);
    shadowed
}

fn merge_at(
    accumulated: &mut Map,
    incoming: Map,
    path: &mut Vec<String>,
    shadowed: &mut Vec<String>,
) {
    for (key, value) in incoming {
        match accumulated.get_mut(&key) {
            None => {
                accumulated.insert(key, value);
            }
            Some(Node::Map(existing)) => match value {
                Node::Map(children) => {
                    path.push(key);
                    merge_at(existing, children, path, shadowed);
                    path.pop();
                }
                Node::Scalar(_) | Node::Seq(_) => shadowed.push(join(path, &key)),
            },
            Some(Node::Scalar(_) | Node::Seq(_)) => shadowed.push(join(path, &key)),
        }
    }
}

fn join(path: &[String], key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path.join("."), key)
    }
}
