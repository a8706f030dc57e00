//! Layered configuration from command-line flags, environment variables,
//! YAML and JSON.
//!
//! Every source is turned into a tree of nested maps keyed by the segments
//! of dotted keys (`foo.redis.port`). Trees are overlaid onto one
//! accumulated [`Config`], and the source loaded **first** wins whenever two
//! sources set the same leaf.
//!
//! # Pipeline
//!
//! - [`interpret`] types a raw token as integer, float, boolean or string
//! - [`flags`] and [`env`] tokenize arguments and environment entries into
//!   [`KeyValue`] pairs
//! - [`tree`] expands a batch of pairs into a [`Map`]
//! - [`merge`] overlays a tree onto the accumulated one
//! - [`convert`] reads YAML and JSON documents into trees and writes YAML
//! - [`Config`] ties these together and adds typed, defaulted accessors
//! - [`loader`] and [`global`] cover whole-process setup
//!
//! # Example
//!
//! ```rust
//! use overlay_config::Config;
//!
//! let mut config = Config::new();
//! config.load_args(&["-foo.redis.port=6380"]);
//! config.load_envs(["FOO_REDIS_PORT=6379", "FOO_REDIS_HOST=localhost"]);
//!
//! assert_eq!(config.as_int("foo.redis.port", 0), 6380);
//! assert_eq!(config.as_string("foo.redis.host", ""), "localhost");
//! ```

mod config;
mod error;
mod interpret;
mod types;

pub mod convert;
pub mod env;
pub mod flags;
pub mod global;
pub mod loader;
pub mod merge;
pub mod tree;

pub use config::{Config, ROOT};

pub use error::{ConfigError, Result};

pub use interpret::interpret;

pub use types::{KeyValue, Map, Node, Scalar};

pub use loader::{LoadError, LoadOptions, Loaded, UsageEntry, ValueKind};
