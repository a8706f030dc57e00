//! Core type definitions for the configuration tree.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::fmt;

/// Children of a map node, in insertion order.
pub type Map = IndexMap<String, Node>;

/// A typed leaf value.
///
/// Scalars are produced either by the type interpreter (for untyped tokens
/// coming from arguments and environment variables) or by structured file
/// ingestion, where the document format already carries the type.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    UnsignedInteger(u64),
    SignedInteger(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A typed leaf.
    Scalar(Scalar),

    /// A sequence from a structured document.
    ///
    /// Sequences are opaque leaves: paths never descend into them and
    /// overlays never merge them element-wise.
    Seq(Vec<Node>),

    /// An internal node; the only variant paths can descend through.
    Map(Map),
}

/// A dotted path paired with the scalar it should hold.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Scalar,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: Scalar) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

impl Scalar {
    /// Get the value as a signed integer.
    ///
    /// Unsigned values are reinterpreted without overflow checks.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::SignedInteger(i) => Some(*i),
            Scalar::UnsignedInteger(u) => Some(*u as i64),
            _ => None,
        }
    }

    /// Get the value as an unsigned integer.
    ///
    /// Negative values wrap, mirroring a plain `as` cast.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Scalar::UnsignedInteger(u) => Some(*u),
            Scalar::SignedInteger(i) => Some(*i as u64),
            _ => None,
        }
    }

    /// Get the value as a float. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Float(f) => Some(*f),
            Scalar::UnsignedInteger(u) => Some(*u as f64),
            Scalar::SignedInteger(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the string, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable name of the scalar kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Scalar::UnsignedInteger(_) => "uint",
            Scalar::SignedInteger(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Boolean(_) => "bool",
            Scalar::String(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::UnsignedInteger(u) => write!(f, "{}", u),
            Scalar::SignedInteger(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Boolean(b) => write!(f, "{}", b),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::String(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::String(s)
    }
}

impl From<u64> for Scalar {
    fn from(u: u64) -> Self {
        Scalar::UnsignedInteger(u)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Scalar::SignedInteger(i)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Scalar::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Boolean(b)
    }
}

impl Node {
    /// Create an empty map node.
    pub fn empty_map() -> Self {
        Node::Map(Map::new())
    }

    /// Check if this node is a leaf (scalar or sequence).
    pub fn is_leaf(&self) -> bool {
        !self.is_map()
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Node]> {
        match self {
            Node::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a direct child by key. Returns `None` for leaves.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map()?.get(key)
    }
}

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Node::Scalar(scalar)
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Scalar::UnsignedInteger(u) => serializer.serialize_u64(*u),
            Scalar::SignedInteger(i) => serializer.serialize_i64(*i),
            Scalar::Float(x) => serializer.serialize_f64(*x),
            Scalar::Boolean(b) => serializer.serialize_bool(*b),
            Scalar::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Scalar(scalar) => scalar.serialize(serializer),
            Node::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_integer_conversions() {
        assert_eq!(Scalar::UnsignedInteger(123).as_i64(), Some(123));
        assert_eq!(Scalar::SignedInteger(-50).as_i64(), Some(-50));
        assert_eq!(Scalar::SignedInteger(-1).as_u64(), Some(u64::MAX));
        assert_eq!(Scalar::String("123".into()).as_i64(), None);
        assert_eq!(Scalar::Float(1.5).as_i64(), None);
    }

    #[test]
    fn test_scalar_float_widening() {
        assert_eq!(Scalar::Float(3.5).as_f64(), Some(3.5));
        assert_eq!(Scalar::UnsignedInteger(2).as_f64(), Some(2.0));
        assert_eq!(Scalar::SignedInteger(-2).as_f64(), Some(-2.0));
        assert_eq!(Scalar::Boolean(true).as_f64(), None);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::UnsignedInteger(7).to_string(), "7");
        assert_eq!(Scalar::SignedInteger(-7).to_string(), "-7");
        assert_eq!(Scalar::Float(3.25).to_string(), "3.25");
        assert_eq!(Scalar::Boolean(false).to_string(), "false");
        assert_eq!(Scalar::String("\"quoted\"".into()).to_string(), "\"quoted\"");
    }

    #[test]
    fn test_node_kinds() {
        let leaf = Node::Scalar(Scalar::Boolean(true));
        let seq = Node::Seq(vec![leaf.clone()]);
        let map = Node::empty_map();

        assert!(leaf.is_leaf());
        assert!(seq.is_leaf());
        assert!(map.is_map());
        assert_eq!(seq.as_seq().map(<[Node]>::len), Some(1));
        assert!(leaf.get("anything").is_none());
    }

    #[test]
    fn test_node_serializes_to_yaml_value() {
        let mut inner = Map::new();
        inner.insert("id".into(), Node::Scalar(Scalar::UnsignedInteger(1)));
        let mut root = Map::new();
        root.insert("foo".into(), Node::Map(inner));

        let value = serde_yaml::to_value(Node::Map(root)).unwrap();
        assert_eq!(value["foo"]["id"].as_u64(), Some(1));
    }
}
