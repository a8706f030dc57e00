//! Building trees out of dotted key/value pairs.

use crate::types::{KeyValue, Map, Node};

/// Build a tree from ordered key/value pairs.
///
/// Each key is split on `.`; every segment but the last becomes a map node
/// and the last one a leaf holding the value.
///
/// Within one batch the first write wins. When an earlier pair already put a
/// leaf where a later pair needs to descend (`foo.redis` followed by
/// `foo.redis.host`) the later pair is dropped, and a later pair naming an
/// existing path (leaf or subtree) leaves it untouched.
///
/// A pair with an empty key is dropped: the empty path names the root.
pub fn build(kvs: impl IntoIterator<Item = KeyValue>) -> Map {
    let mut root = Map::new();
    for kv in kvs {
        if kv.key.is_empty() {
            tracing::trace!(value = %kv.value, "Dropping pair with an empty key");
            continue;
        }
        if !insert_first_wins(&mut root, &kv) {
            tracing::trace!(key = %kv.key, "Dropping key shadowed within the same batch");
        }
    }
    root
}

/// Insert a single pair. Returns `false` when the pair was dropped.
fn insert_first_wins(root: &mut Map, kv: &KeyValue) -> bool {
    let mut segments = kv.key.split('.').peekable();
    let mut current = root;

    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            if current.contains_key(segment) {
                return false;
            }
            current.insert(segment.to_string(), Node::Scalar(kv.value.clone()));
            return true;
        }

        let child = current
            .entry(segment.to_string())
            .or_insert_with(Node::empty_map);
        match child {
            Node::Map(map) => current = map,
            Node::Scalar(_) | Node::Seq(_) => return false,
        }
    }

    false
}
