//! Command-line argument tokenizer.
//!
//! Accepted forms, with one or two dashes:
//!
//! ```text
//! -name=foo   --name=foo    <name, "foo">
//! -name foo   --name foo    <name, "foo">
//! -on         --on          <on, true>     (last token, or next token is a flag)
//! -id -5                    <id, -5>       (negative numbers are values, not flags)
//! ```
//!
//! Tokens that do not start with a dash are skipped. Values go through the
//! type interpreter. Duplicate keys are kept in order; the tree builder
//! decides which one survives.

use crate::interpret::{interpret, is_all_digits};
use crate::types::KeyValue;

/// A flag before type interpretation; both sides borrow from the arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFlag<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Tokenize command-line arguments into ordered key/value pairs.
pub fn tokenize<S: AsRef<str>>(args: &[S]) -> Vec<KeyValue> {
    tokenize_raw(args)
        .into_iter()
        .map(|flag| KeyValue::new(flag.key, interpret(flag.value)))
        .collect()
}

/// Tokenize command-line arguments, keeping values as written.
///
/// A bare flag without a value yields the text `true`.
pub fn tokenize_raw<S: AsRef<str>>(args: &[S]) -> Vec<RawFlag<'_>> {
    let mut flags = Vec::new();
    let mut i = 0;

    while i < args.len() {
        let token = args[i].as_ref();
        i += 1;

        let Some(body) = strip_dashes(token) else {
            tracing::trace!(token, "Skipping argument without leading dash");
            continue;
        };

        let (key, value) = match body.split_once('=') {
            Some((key, value)) => (key, value),
            None => match args.get(i).map(|next| next.as_ref()) {
                Some(next) if !looks_like_flag(next) => {
                    i += 1;
                    (body, next)
                }
                _ => (body, "true"),
            },
        };

        if key.is_empty() {
            tracing::trace!(token, "Skipping argument with empty key");
            continue;
        }

        flags.push(RawFlag { key, value });
    }

    flags
}

fn strip_dashes(token: &str) -> Option<&str> {
    token
        .strip_prefix("--")
        .or_else(|| token.strip_prefix('-'))
}

/// A token starts a new flag when it begins with `-` and is not a negative
/// integer.
fn looks_like_flag(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => !is_all_digits(rest),
        None => false,
    }
}
