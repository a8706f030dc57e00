//! Environment variable tokenizer.
//!
//! Entries have the form `KEY=VALUE`. Keys are normalized into dotted paths:
//! leading underscores are trimmed, the remaining underscores become `.`, and
//! the result is lower-cased. `_P9K_SSH_TTY` becomes `p9k.ssh.tty`.

use crate::interpret::interpret;
use crate::types::KeyValue;

/// Tokenize `KEY=VALUE` entries into ordered key/value pairs.
///
/// Entries without `=`, or whose key normalizes to nothing (such as `_`),
/// are skipped.
pub fn tokenize<I, S>(envs: I) -> Vec<KeyValue>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    envs.into_iter()
        .filter_map(|entry| {
            let (raw_key, raw_value) = entry.as_ref().split_once('=')?;
            let key = normalize_key(raw_key);
            if key.is_empty() {
                return None;
            }
            Some(KeyValue::new(key, interpret(raw_value)))
        })
        .collect()
}

/// Turn an environment variable name into a dotted path.
pub fn normalize_key(raw: &str) -> String {
    raw.trim_start_matches('_').replace('_', ".").to_lowercase()
}

/// Format `(name, value)` pairs, as yielded by [`std::env::vars`], into
/// `KEY=VALUE` entries.
pub fn entries_from_vars<I>(vars: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect()
}
