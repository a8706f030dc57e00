//! Errors surfaced by the configuration store.
//!
//! Only file ingestion and `unmarshal` can fail. Malformed arguments are
//! dropped during tokenization and accessors fall back to their defaults, so
//! neither has an error variant here.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading or reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Content handed to a loader is not valid UTF-8.
    #[error("configuration content is not valid UTF-8")]
    Encoding(#[from] std::str::Utf8Error),

    /// YAML syntax error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] yaml_rust2::ScanError),

    /// JSON syntax error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed, but its root is not a mapping.
    #[error("top-level {format} document must be a mapping, found {found}")]
    NotAMapping {
        format: &'static str,
        found: &'static str,
    },

    /// A non-defaulted lookup found nothing at the path.
    #[error("key doesn't exist: {0}")]
    KeyNotFound(String),

    /// The subtree at the path does not fit the requested type.
    #[error("cannot unmarshal `{path}`: {source}")]
    Unmarshal {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
