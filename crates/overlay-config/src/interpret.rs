//! Classification of raw tokens into typed scalars.
//!
//! Arguments and environment variables arrive as plain strings. This module
//! decides what they mean:
//!
//! - `123` is an unsigned integer, `-123` a signed one
//! - `123.0` and `-1.5` are floats
//! - `true`/`false` (any case) are booleans
//! - everything else stays a string, verbatim (quotes are *not* stripped,
//!   so `"123"` is the five-character string)
//!
//! Numeric parse failures, such as a value that overflows `u64`, degrade to
//! a string instead of failing the whole load.

use crate::types::Scalar;

/// Shape of a token, decided by a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenShape {
    Unsigned,
    Signed,
    Float,
    Other,
}

fn shape_of(token: &str) -> TokenShape {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    if body.is_empty() {
        return TokenShape::Other;
    }

    let mut dots = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => {}
            '.' => {
                dots += 1;
                if dots > 1 {
                    return TokenShape::Other;
                }
            }
            _ => return TokenShape::Other,
        }
    }

    match (dots, negative) {
        (0, false) => TokenShape::Unsigned,
        (0, true) => TokenShape::Signed,
        _ => TokenShape::Float,
    }
}

/// Interpret a raw token as a typed scalar.
pub fn interpret(token: &str) -> Scalar {
    let parsed = match shape_of(token) {
        TokenShape::Unsigned => token.parse().ok().map(Scalar::UnsignedInteger),
        TokenShape::Signed => token.parse().ok().map(Scalar::SignedInteger),
        TokenShape::Float => token.parse().ok().map(Scalar::Float),
        TokenShape::Other => parse_bool(token).map(Scalar::Boolean),
    };
    parsed.unwrap_or_else(|| Scalar::String(token.to_string()))
}

fn parse_bool(token: &str) -> Option<bool> {
    if token.eq_ignore_ascii_case("true") {
        Some(true)
    } else if token.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Check whether every character is an ASCII digit. Vacuously true for `""`.
pub(crate) fn is_all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
