//! Conversion between structured documents and configuration trees.
//!
//! YAML is read with `yaml-rust2`, JSON with `serde_json`. Both produce the
//! same [`Node`] model:
//!
//! - integers become `UnsignedInteger` when non-negative, `SignedInteger`
//!   otherwise (the same split the type interpreter makes)
//! - sequences become opaque [`Node::Seq`] leaves
//! - `null` values are dropped, so a key set to null is simply absent
//! - YAML scalar keys that are not strings (`1: x`, `true: y`) use their text

use crate::error::{ConfigError, Result};
use crate::types::{Map, Node, Scalar};
use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlLoader};

/// Parse a YAML document into a tree.
///
/// Only the first document of a multi-document stream is used. An empty
/// document yields an empty tree.
pub fn tree_from_yaml_str(content: &str) -> Result<Map> {
    let mut docs = YamlLoader::load_from_str(content)?;
    if docs.is_empty() {
        return Ok(Map::new());
    }
    match docs.swap_remove(0) {
        Yaml::Hash(hash) => Ok(map_from_yaml_hash(hash)),
        Yaml::Null => Ok(Map::new()),
        other => Err(ConfigError::NotAMapping {
            format: "YAML",
            found: yaml_kind(&other),
        }),
    }
}

/// Parse a JSON document into a tree.
pub fn tree_from_json_str(content: &str) -> Result<Map> {
    match serde_json::from_str::<serde_json::Value>(content)? {
        serde_json::Value::Object(object) => Ok(map_from_json_object(object)),
        other => Err(ConfigError::NotAMapping {
            format: "JSON",
            found: json_kind(&other),
        }),
    }
}

fn map_from_yaml_hash(hash: Hash) -> Map {
    let mut map = Map::with_capacity(hash.len());
    for (key, value) in hash {
        let Some(key) = yaml_key_text(&key) else {
            tracing::debug!(?key, "Skipping YAML entry with a non-scalar key");
            continue;
        };
        if let Some(node) = node_from_yaml(value) {
            // Later duplicates in the same document do not override earlier ones.
            map.entry(key).or_insert(node);
        }
    }
    map
}

fn node_from_yaml(yaml: Yaml) -> Option<Node> {
    let node = match yaml {
        Yaml::Hash(hash) => Node::Map(map_from_yaml_hash(hash)),
        Yaml::Array(items) => Node::Seq(items.into_iter().filter_map(node_from_yaml).collect()),
        Yaml::Integer(i) => Node::Scalar(integer_scalar(i)),
        Yaml::Real(ref text) => Node::Scalar(real_scalar(text, yaml.as_f64())),
        Yaml::Boolean(b) => Node::Scalar(Scalar::Boolean(b)),
        Yaml::String(s) => Node::Scalar(Scalar::String(s)),
        Yaml::Null | Yaml::Alias(_) | Yaml::BadValue => return None,
    };
    Some(node)
}

/// Scalar for a plain token the YAML resolver took for a float.
///
/// Integers beyond `i64` arrive here and stay integers when they fit `u64`.
/// Words such as `inf` or `nan`, which only Rust's float parser accepts, stay
/// strings; YAML spells those `.inf` and `.nan`.
fn real_scalar(text: &str, parsed: Option<f64>) -> Scalar {
    if let Ok(u) = text.parse::<u64>() {
        return Scalar::UnsignedInteger(u);
    }
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    match parsed {
        Some(x) if unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            Scalar::Float(x)
        }
        _ => Scalar::String(text.to_string()),
    }
}

fn yaml_key_text(key: &Yaml) -> Option<String> {
    match key {
        Yaml::String(s) | Yaml::Real(s) => Some(s.clone()),
        Yaml::Integer(i) => Some(i.to_string()),
        Yaml::Boolean(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer_scalar(i: i64) -> Scalar {
    if i >= 0 {
        Scalar::UnsignedInteger(i as u64)
    } else {
        Scalar::SignedInteger(i)
    }
}

fn yaml_kind(yaml: &Yaml) -> &'static str {
    match yaml {
        Yaml::Real(_) => "float",
        Yaml::Integer(_) => "integer",
        Yaml::String(_) => "string",
        Yaml::Boolean(_) => "boolean",
        Yaml::Array(_) => "sequence",
        Yaml::Hash(_) => "mapping",
        Yaml::Alias(_) => "alias",
        Yaml::Null => "null",
        Yaml::BadValue => "invalid value",
    }
}

fn map_from_json_object(object: serde_json::Map<String, serde_json::Value>) -> Map {
    object
        .into_iter()
        .filter_map(|(key, value)| node_from_json(value).map(|node| (key, node)))
        .collect()
}

fn node_from_json(value: serde_json::Value) -> Option<Node> {
    use serde_json::Value;

    let node = match value {
        Value::Object(object) => Node::Map(map_from_json_object(object)),
        Value::Array(items) => Node::Seq(items.into_iter().filter_map(node_from_json).collect()),
        Value::Number(number) => {
            let scalar = if let Some(u) = number.as_u64() {
                Scalar::UnsignedInteger(u)
            } else if let Some(i) = number.as_i64() {
                Scalar::SignedInteger(i)
            } else {
                Scalar::Float(number.as_f64()?)
            };
            Node::Scalar(scalar)
        }
        Value::Bool(b) => Node::Scalar(Scalar::Boolean(b)),
        Value::String(s) => Node::Scalar(Scalar::String(s)),
        Value::Null => return None,
    };
    Some(node)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Emit a tree as YAML text.
///
/// Block style with two-space indentation and no `---` document marker; the
/// text ends with a newline. Loading the text back yields the same tree.
pub fn tree_to_yaml_string(map: &Map) -> String {
    let mut out = String::new();
    if map.is_empty() {
        out.push_str("{}\n");
    } else {
        write_map(&mut out, map, 0);
    }
    out
}

/// Emit any node, leaf or subtree, as YAML text.
pub fn node_to_yaml_string(node: &Node) -> String {
    match node {
        Node::Map(map) => tree_to_yaml_string(map),
        Node::Seq(items) if items.is_empty() => "[]\n".to_string(),
        Node::Seq(items) => {
            let mut out = String::new();
            write_seq(&mut out, items, 0);
            out
        }
        Node::Scalar(scalar) => format!("{}\n", scalar_text(scalar)),
    }
}

fn write_map(out: &mut String, map: &Map, indent: usize) {
    for (key, value) in map {
        push_indent(out, indent);
        out.push_str(&string_text(key));
        out.push(':');
        write_child(out, value, indent);
    }
}

fn write_seq(out: &mut String, items: &[Node], indent: usize) {
    for item in items {
        push_indent(out, indent);
        out.push('-');
        write_child(out, item, indent);
    }
}

/// Write the value following a `key:` or `-` indicator.
fn write_child(out: &mut String, node: &Node, indent: usize) {
    match node {
        Node::Scalar(scalar) => {
            out.push(' ');
            out.push_str(&scalar_text(scalar));
            out.push('\n');
        }
        Node::Map(map) if map.is_empty() => out.push_str(" {}\n"),
        Node::Seq(items) if items.is_empty() => out.push_str(" []\n"),
        Node::Map(map) => {
            out.push('\n');
            write_map(out, map, indent + 2);
        }
        Node::Seq(items) => {
            out.push('\n');
            write_seq(out, items, indent + 2);
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

fn scalar_text(scalar: &Scalar) -> String {
    match scalar {
        Scalar::UnsignedInteger(u) => u.to_string(),
        Scalar::SignedInteger(i) => i.to_string(),
        Scalar::Float(x) => float_text(*x),
        Scalar::Boolean(b) => b.to_string(),
        Scalar::String(s) => string_text(s),
    }
}

/// YAML spelling of a float; always keeps a fractional part or an exponent
/// so the value reads back as a float.
fn float_text(x: f64) -> String {
    if x.is_nan() {
        ".nan".to_string()
    } else if x.is_infinite() {
        let text = if x > 0.0 { ".inf" } else { "-.inf" };
        text.to_string()
    } else {
        format!("{:?}", x)
    }
}

/// A string as a plain scalar when that reads back as the same string,
/// double-quoted otherwise.
fn string_text(s: &str) -> String {
    if is_plain_safe(s) && matches!(Yaml::from_str(s), Yaml::String(_)) {
        s.to_string()
    } else {
        // JSON string escapes are valid in YAML double-quoted scalars.
        serde_json::Value::from(s).to_string()
    }
}

fn is_plain_safe(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/');
    allowed(first) && chars.all(|c| allowed(c) || matches!(c, '-' | '+' | '@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_scalars() {
        let tree = tree_from_yaml_str(
            r#"
name: test-foo
id: 123
temp: -50
pi: 3.1415926
onoff: true
quoted: "123"
"#,
        )
        .unwrap();

        let scalar = |key: &str| tree.get(key).and_then(Node::as_scalar).cloned();
        assert_eq!(scalar("name"), Some(Scalar::String("test-foo".into())));
        assert_eq!(scalar("id"), Some(Scalar::UnsignedInteger(123)));
        assert_eq!(scalar("temp"), Some(Scalar::SignedInteger(-50)));
        assert_eq!(scalar("pi"), Some(Scalar::Float(3.1415926)));
        assert_eq!(scalar("onoff"), Some(Scalar::Boolean(true)));
        assert_eq!(scalar("quoted"), Some(Scalar::String("123".into())));
    }

    #[test]
    fn test_yaml_sequences_are_leaves() {
        let tree = tree_from_yaml_str("hosts:\n  - a\n  - b\n").unwrap();
        assert_eq!(
            tree.get("hosts"),
            Some(&Node::Seq(vec![
                Node::Scalar(Scalar::String("a".into())),
                Node::Scalar(Scalar::String("b".into())),
            ]))
        );
    }

    #[test]
    fn test_yaml_nulls_are_dropped() {
        let tree = tree_from_yaml_str("a: ~\nb: 1\nc: [1, null]\n").unwrap();
        assert!(!tree.contains_key("a"));
        assert!(tree.contains_key("b"));
        assert_eq!(tree.get("c").and_then(Node::as_seq).map(<[Node]>::len), Some(1));
    }

    #[test]
    fn test_yaml_non_string_keys() {
        let tree = tree_from_yaml_str("1: one\ntrue: yes\n").unwrap();
        assert!(tree.contains_key("1"));
        assert!(tree.contains_key("true"));
    }

    #[test]
    fn test_yaml_empty_document() {
        assert!(tree_from_yaml_str("").unwrap().is_empty());
        assert!(tree_from_yaml_str("# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn test_yaml_root_must_be_mapping() {
        let err = tree_from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotAMapping {
                format: "YAML",
                found: "sequence"
            }
        ));
    }

    #[test]
    fn test_yaml_syntax_error() {
        let err = tree_from_yaml_str("foo: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_json_document() {
        let json = r#"{"foo": {
            "id": 123, "temp": -50, "pi": 2.5, "on": true, "tags": ["x"], "gone": null
        }}"#;
        let tree = tree_from_json_str(json).unwrap();

        let foo = tree.get("foo").and_then(Node::as_map).unwrap();
        assert_eq!(foo.get("id"), Some(&Node::Scalar(Scalar::UnsignedInteger(123))));
        assert_eq!(foo.get("temp"), Some(&Node::Scalar(Scalar::SignedInteger(-50))));
        assert_eq!(foo.get("pi"), Some(&Node::Scalar(Scalar::Float(2.5))));
        assert_eq!(foo.get("on"), Some(&Node::Scalar(Scalar::Boolean(true))));
        assert!(foo.get("tags").is_some_and(Node::is_leaf));
        assert!(!foo.contains_key("gone"));
    }

    #[test]
    fn test_json_root_must_be_object() {
        let err = tree_from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotAMapping {
                format: "JSON",
                found: "array"
            }
        ));
    }

    #[test]
    fn test_float_text_reads_back_as_float() {
        assert_eq!(float_text(123.0), "123.0");
        assert_eq!(float_text(3.25), "3.25");
        assert_eq!(float_text(f64::INFINITY), ".inf");
        assert_eq!(float_text(f64::NEG_INFINITY), "-.inf");
    }

    #[test]
    fn test_yaml_text_round_trips_types() {
        let tree = tree_from_yaml_str("a: 1\nb: -2\nc: 1.0\nd: \"true\"\ne: x\n").unwrap();
        let text = tree_to_yaml_string(&tree);
        assert_eq!(tree_from_yaml_str(&text).unwrap(), tree);
    }

    #[test]
    fn test_ambiguous_strings_are_quoted() {
        let ambiguous = [
            "0o17", "0x1F", "007", "+5", "2024.10", "inf", "nan", "+.inf", "true", "~", "",
        ];
        for text in ambiguous {
            let mut tree = Map::new();
            tree.insert(text.to_string(), Node::Scalar(Scalar::String(text.to_string())));
            let yaml = tree_to_yaml_string(&tree);
            assert_eq!(tree_from_yaml_str(&yaml).unwrap(), tree, "{yaml}");
        }
        assert_eq!(string_text("plain/path-1.yaml"), "plain/path-1.yaml");
        assert_eq!(string_text("007"), "\"007\"");
        assert_eq!(string_text("a: \"b\"\n"), "\"a: \\\"b\\\"\\n\"");
    }

    #[test]
    fn test_integers_beyond_i64_stay_integers() {
        let tree = tree_from_yaml_str("big: 18446744073709551615\nhuge: 18446744073709551616\n")
            .unwrap();
        assert_eq!(tree["big"], Node::Scalar(Scalar::UnsignedInteger(u64::MAX)));
        assert!(matches!(tree["huge"], Node::Scalar(Scalar::Float(_))));

        let yaml = tree_to_yaml_string(&tree);
        assert_eq!(tree_from_yaml_str(&yaml).unwrap(), tree);
    }

    #[test]
    fn test_float_words_without_dot_are_strings() {
        let tree = tree_from_yaml_str("a: inf\nb: .inf\nc: -.inf\nd: 1e5\n").unwrap();
        assert_eq!(tree["a"], Node::Scalar(Scalar::String("inf".into())));
        assert_eq!(tree["b"], Node::Scalar(Scalar::Float(f64::INFINITY)));
        assert_eq!(tree["c"], Node::Scalar(Scalar::Float(f64::NEG_INFINITY)));
        assert_eq!(tree["d"], Node::Scalar(Scalar::Float(1e5)));
    }

    #[test]
    fn test_nested_layout() {
        let tree = tree_from_yaml_str("a:\n  b: 1\n  e: {}\n  l:\n  - x\n  - - 2\n  - k: v\n")
            .unwrap();
        let yaml = tree_to_yaml_string(&tree);
        let expected = "a:\n  b: 1\n  e: {}\n  l:\n    - x\n    -\n      - 2\n    -\n      k: v\n";
        assert_eq!(yaml, expected);
        assert_eq!(tree_from_yaml_str(&yaml).unwrap(), tree);
    }
}
