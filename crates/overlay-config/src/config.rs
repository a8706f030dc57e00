//! The configuration store and its typed accessors.
//!
//! A [`Config`] owns one accumulated tree. Every load builds a complete
//! candidate tree from its source first and only then overlays it, so a
//! source that fails to read or parse leaves the store untouched.
//!
//! # Example
//!
//! ```rust
//! use overlay_config::Config;
//!
//! let mut config = Config::new();
//! config.load_args(&["-foo.name=foo1", "--foo.id", "123"]);
//! config.load_yaml("foo:\n  name: ignored\n  port: 6380\n").unwrap();
//!
//! assert_eq!(config.as_string("foo.name", "default"), "foo1");
//! assert_eq!(config.as_int("foo.port", 0), 6380);
//! assert_eq!(config.as_bool("foo.missing", true), true);
//! ```

use crate::convert;
use crate::error::{ConfigError, Result};
use crate::loader::RESERVED_PREFIX;
use crate::merge::merge;
use crate::tree::build;
use crate::types::{KeyValue, Map, Node, Scalar};
use crate::{env, flags};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Path addressing the whole tree.
pub const ROOT: &str = "";

/// An accumulated, overlayed configuration tree.
///
/// Sources loaded earlier take precedence over sources loaded later. The
/// store is not synchronized; share it read-only once loading is done.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Always a [`Node::Map`].
    root: Node,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: Node::empty_map(),
        }
    }
}

impl Config {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the whole accumulated tree.
    pub fn root(&self) -> &Map {
        match &self.root {
            Node::Map(map) => map,
            _ => unreachable!("config root is always a map"),
        }
    }

    fn root_mut(&mut self) -> &mut Map {
        match &mut self.root {
            Node::Map(map) => map,
            _ => unreachable!("config root is always a map"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }

    /// Overlay an already built tree.
    pub fn overlay(&mut self, tree: Map) {
        let shadowed = merge(self.root_mut(), tree);
        for path in &shadowed {
            tracing::debug!(%path, "Kept earlier value; later source ignored");
        }
    }

    /// Load YAML content.
    pub fn load_yaml(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let content = std::str::from_utf8(data.as_ref())?;
        let tree = convert::tree_from_yaml_str(content)?;
        self.overlay(tree);
        Ok(())
    }

    /// Load a YAML file.
    pub fn load_yaml_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = read_file(path)?;
        self.load_yaml(data)?;
        tracing::debug!(path = %path.display(), "Loaded YAML file");
        Ok(())
    }

    /// Load JSON content.
    pub fn load_json(&mut self, data: impl AsRef<[u8]>) -> Result<()> {
        let content = std::str::from_utf8(data.as_ref())?;
        let tree = convert::tree_from_json_str(content)?;
        self.overlay(tree);
        Ok(())
    }

    /// Load a JSON file.
    pub fn load_json_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = read_file(path)?;
        self.load_json(data)?;
        tracing::debug!(path = %path.display(), "Loaded JSON file");
        Ok(())
    }

    /// Load command-line arguments. Returns the number of pairs loaded.
    ///
    /// Keys in the loader's reserved `ov.` namespace are skipped; see
    /// [`crate::loader`].
    pub fn load_args<S: AsRef<str>>(&mut self, args: &[S]) -> usize {
        let kvs: Vec<KeyValue> = flags::tokenize(args)
            .into_iter()
            .filter(|kv| !kv.key.starts_with(RESERVED_PREFIX))
            .collect();
        self.load_kvs(kvs)
    }

    /// Load `KEY=VALUE` environment entries. Returns the number of pairs
    /// loaded.
    pub fn load_envs<I, S>(&mut self, envs: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.load_kvs(env::tokenize(envs))
    }

    /// Load dotted key/value pairs. Returns the number of pairs given.
    ///
    /// Overlapping keys within the batch resolve first-wins, see
    /// [`crate::tree::build`].
    pub fn load_kvs(&mut self, kvs: Vec<KeyValue>) -> usize {
        let count = kvs.len();
        self.overlay(build(kvs));
        count
    }

    /// Resolve a dotted path. [`ROOT`] resolves to the whole tree.
    ///
    /// Returns `None` when a segment is missing or when the path tries to
    /// descend through a leaf.
    pub fn get(&self, path: &str) -> Option<&Node> {
        if path == ROOT {
            return Some(&self.root);
        }
        path.split('.').try_fold(&self.root, |node, segment| node.get(segment))
    }

    /// Check whether a path resolves to anything.
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn as_string(&self, path: &str, default: &str) -> String {
        self.scalar(path).map_or_else(|| default.to_string(), ToString::to_string)
    }

    pub fn as_int(&self, path: &str, default: isize) -> isize {
        self.scalar(path).and_then(|s| s.as_i64()).map_or(default, |i| i as isize)
    }

    pub fn as_uint(&self, path: &str, default: usize) -> usize {
        self.scalar(path).and_then(|s| s.as_u64()).map_or(default, |u| u as usize)
    }

    pub fn as_int64(&self, path: &str, default: i64) -> i64 {
        self.scalar(path).and_then(|s| s.as_i64()).unwrap_or(default)
    }

    pub fn as_uint64(&self, path: &str, default: u64) -> u64 {
        self.scalar(path).and_then(|s| s.as_u64()).unwrap_or(default)
    }

    pub fn as_float64(&self, path: &str, default: f64) -> f64 {
        self.scalar(path).and_then(|s| s.as_f64()).unwrap_or(default)
    }

    pub fn as_bool(&self, path: &str, default: bool) -> bool {
        self.scalar(path).and_then(|s| s.as_bool()).unwrap_or(default)
    }

    /// Deserialize the subtree (or leaf) at `path` into `T`.
    ///
    /// The node is first turned into a YAML value, so `T` maps fields the
    /// way it would for a YAML document (`#[serde(rename = ...)]` and
    /// friends apply). Unlike the accessors there is no default: a missing
    /// path is [`ConfigError::KeyNotFound`].
    pub fn unmarshal<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let node = self.get(path).ok_or_else(|| ConfigError::KeyNotFound(path.to_string()))?;
        let unmarshal_error = |source| ConfigError::Unmarshal {
            path: path.to_string(),
            source,
        };
        let value = serde_yaml::to_value(node).map_err(unmarshal_error)?;
        serde_yaml::from_value(value).map_err(unmarshal_error)
    }

    /// Serialize the whole tree as YAML text that loads back to the same tree.
    pub fn dump_yaml(&self) -> String {
        convert::tree_to_yaml_string(self.root())
    }

    fn scalar(&self, path: &str) -> Option<&Scalar> {
        self.get(path).and_then(Node::as_scalar)
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        let mut config = Config::new();
        config.load_args(&[
            "-foo.name=foo1",
            "-foo.id=123",
            "-foo.temp=-50",
            "-foo.ratio=0.5",
            "-foo.enabled",
        ]);
        config
    }

    #[test]
    fn test_root_path_is_whole_tree() {
        let config = sample();
        let root = config.get(ROOT).and_then(Node::as_map).unwrap();
        assert_eq!(root, config.root());
        assert!(Config::new().get(ROOT).is_some());
    }

    #[test]
    fn test_missing_paths_use_defaults() {
        let config = sample();
        assert_eq!(config.as_int("missing.path", 42), 42);
        assert_eq!(config.as_string("foo.missing", "dflt"), "dflt");
        assert_eq!(config.as_bool("foo.name.deeper", true), true);
        assert!(!config.contains("foo.id.deeper"));
    }

    #[test]
    fn test_subtree_is_not_a_scalar() {
        let config = sample();
        assert_eq!(config.as_string("foo", "dflt"), "dflt");
        assert_eq!(config.as_int("foo", 7), 7);
    }

    #[test]
    fn test_accessor_coercions() {
        let config = sample();
        assert_eq!(config.as_int("foo.id", 0), 123);
        assert_eq!(config.as_uint64("foo.id", 0), 123);
        assert_eq!(config.as_int64("foo.temp", 0), -50);
        assert_eq!(config.as_float64("foo.ratio", 0.0), 0.5);
        assert_eq!(config.as_float64("foo.id", 0.0), 123.0);
        assert_eq!(config.as_bool("foo.enabled", false), true);

        // Floats never truncate into integers.
        assert_eq!(config.as_int("foo.ratio", -1), -1);
        // Booleans are not integers.
        assert_eq!(config.as_int("foo.enabled", -1), -1);
        // Strings are not booleans.
        assert_eq!(config.as_bool("foo.name", false), false);
    }

    #[test]
    fn test_as_string_formats_any_scalar() {
        let config = sample();
        assert_eq!(config.as_string("foo.name", ""), "foo1");
        assert_eq!(config.as_string("foo.id", ""), "123");
        assert_eq!(config.as_string("foo.temp", ""), "-50");
        assert_eq!(config.as_string("foo.enabled", ""), "true");
    }

    #[test]
    fn test_negative_through_unsigned_accessor_wraps() {
        let config = sample();
        assert_eq!(config.as_uint64("foo.temp", 0), (-50i64) as u64);
    }

    #[test]
    fn test_reserved_args_are_not_loaded() {
        let mut config = Config::new();
        let count = config.load_args(&["-ov.env", "-ov.f.y=base.yaml", "-app=1"]);
        assert_eq!(count, 1);
        assert!(!config.contains("ov"));
        assert_eq!(config.as_int("app", 0), 1);
    }

    #[test]
    fn test_failed_load_leaves_store_unchanged() {
        let mut config = sample();
        let before = config.clone();

        assert!(config.load_yaml("zzz: 1\nfoo: [unclosed").is_err());
        assert!(config.load_json("{\"zzz\": 1,").is_err());
        assert!(config.load_yaml_file("/definitely/not/here.yaml").is_err());

        assert_eq!(config, before);
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let mut config = Config::new();
        let err = config.load_yaml([0xffu8, 0xfe]).unwrap_err();
        assert!(matches!(err, ConfigError::Encoding(_)));
    }

    #[test]
    fn test_unmarshal_missing_path() {
        let err = sample().unmarshal::<String>("nope").unwrap_err();
        assert!(matches!(err, ConfigError::KeyNotFound(ref path) if path == "nope"));
    }

    #[test]
    fn test_empty_key_pair_is_not_stored() {
        let mut config = Config::new();
        config.load_kvs(vec![KeyValue::new("", 1u64.into())]);
        assert!(config.is_empty());
        assert!(config.get(ROOT).and_then(Node::as_map).is_some());
        assert_eq!(config.dump_yaml(), "{}\n");
    }
}
