//! The tagged scalar held by options and resolved configuration entries.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::OptfigError;

/// Type tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Unknown,
    Int,
    Number,
    Bool,
    Text,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Unknown => "UNKNOWN",
            DataType::Int => "INT",
            DataType::Number => "NUMBER",
            DataType::Bool => "BOOLEAN",
            DataType::Text => "STRING",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration value.
///
/// `Absent` is the empty value: an option with no default, a token that
/// failed to coerce, or a slot that has been [`take`](Value::take)n from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Int(i64),
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Absent => DataType::Unknown,
            Value::Int(_) => DataType::Int,
            Value::Number(_) => DataType::Number,
            Value::Bool(_) => DataType::Bool,
            Value::Text(_) => DataType::Text,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Move the payload out, leaving `Absent` behind.
    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    pub fn as_int(&self) -> Result<i64, OptfigError> {
        match self {
            Value::Int(i) => Ok(*i),
            other => Err(other.mismatch(DataType::Int)),
        }
    }

    pub fn as_number(&self) -> Result<f64, OptfigError> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(other.mismatch(DataType::Number)),
        }
    }

    pub fn as_bool(&self) -> Result<bool, OptfigError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch(DataType::Bool)),
        }
    }

    pub fn as_text(&self) -> Result<&str, OptfigError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch(DataType::Text)),
        }
    }

    fn mismatch(&self, expected: DataType) -> OptfigError {
        OptfigError::TypeMismatch {
            expected,
            found: self.data_type(),
        }
    }

    /// Canonical print form: `null`, a decimal integer, six-digit fixed point,
    /// `true`/`false`, or double-quoted text with `"` and `\` escaped.
    pub fn print(&self) -> String {
        match self {
            Value::Absent => "null".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Number(n) => format!("{n:.6}"),
            Value::Bool(b) => b.to_string(),
            Value::Text(s) => quote(s),
        }
    }

    pub fn print_type(&self) -> &'static str {
        self.data_type().as_str()
    }
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_unit(),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}
