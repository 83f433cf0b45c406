//! Command-line token classification and string-to-value coercion.

use crate::types::BoolPolicy;
use crate::value::{DataType, Value};

/// What a single argv token is, before any schema lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Empty token; cannot be interpreted.
    Unknown,
    /// `--name`
    Flag,
    /// `-n`
    ShortFlag,
    /// Anything else, including negative numbers such as `-3` or `-1.5e2`.
    Value,
}

pub fn classify(token: &str) -> TokenKind {
    if token.is_empty() {
        return TokenKind::Unknown;
    }
    if token.starts_with('-') {
        if token.parse::<f64>().is_ok() {
            return TokenKind::Value;
        }
        if token.starts_with("--") {
            return TokenKind::Flag;
        }
        return TokenKind::ShortFlag;
    }
    TokenKind::Value
}

/// Coerce a raw token into a value of the requested type.
///
/// Returns `Value::Absent` when the token does not fit the type. Text always
/// succeeds. Integers and numbers must consume the whole token (surrounding
/// whitespace is ignored).
pub fn parse_value(token: &str, data_type: DataType, policy: BoolPolicy) -> Value {
    match data_type {
        DataType::Int => token
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_default(),
        DataType::Number => token
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .unwrap_or_default(),
        DataType::Bool => parse_bool(token.trim(), policy),
        DataType::Text => Value::Text(token.to_string()),
        DataType::Unknown => Value::Absent,
    }
}

fn parse_bool(token: &str, policy: BoolPolicy) -> Value {
    let is_false = token.eq_ignore_ascii_case("false") || token.eq_ignore_ascii_case("f");
    match policy {
        BoolPolicy::Permissive => Value::Bool(!is_false),
        BoolPolicy::Strict => {
            if is_false {
                Value::Bool(false)
            } else if token.eq_ignore_ascii_case("true") || token.eq_ignore_ascii_case("t") {
                Value::Bool(true)
            } else {
                Value::Absent
            }
        }
    }
}
