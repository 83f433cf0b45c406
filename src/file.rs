//! Config file loading.
//!
//! A config file is merged into the resolved values on top of the option
//! defaults. Keys use the same canonical flags as the command line; nested
//! JSON objects and TOML tables address options by dotted path
//! (`{"server": {"port": 80}}` sets `server.port`).
//!
//! Loading is best effort: an unreadable or malformed file, or a value of the
//! wrong shape, is logged as a warning and skipped. Keys that match no option
//! are kept as stray values; the schema is never extended.

use std::path::Path;

use crate::config::Config;
#[cfg(any(feature = "json", feature = "toml"))]
use crate::flatten::{self, Leaf};
use crate::token;
use crate::types::{FileFormat, LogLevel};
use crate::value::Value;
#[cfg(any(feature = "json", feature = "toml"))]
use crate::value::DataType;

impl Config {
    /// Read a config file and merge its values. The format comes from the
    /// file extension, falling back to the default format.
    ///
    /// Returns whether every entry was merged. A missing or unreadable file
    /// merges nothing and returns `false`.
    pub fn load_file(&mut self, path: &Path) -> bool {
        let token = path.display().to_string();
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %token, error = %e, "optfig: config file unreadable");
                self.record(LogLevel::Warning, &token, "unable to read config file");
                return false;
            }
        };
        let format = FileFormat::from_path(path).unwrap_or_default();
        tracing::debug!(path = %token, %format, "optfig: loading config file");
        self.load_str(&content, format)
    }

    /// Merge config text of the given format. Returns whether every entry
    /// was merged.
    pub fn load_str(&mut self, content: &str, format: FileFormat) -> bool {
        match format {
            #[cfg(feature = "json")]
            FileFormat::Json => self.load_json(content),
            FileFormat::Csv => self.load_csv(content),
            #[cfg(feature = "toml")]
            FileFormat::Toml => self.load_toml(content),
        }
    }

    fn load_csv(&mut self, content: &str) -> bool {
        let mut success = true;
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let Some((flag, raw)) = line.split_once(',') else {
                self.record(LogLevel::Warning, line, "config line has no value");
                success = false;
                continue;
            };
            if raw.is_empty() {
                self.record(LogLevel::Warning, flag, "config line has no value");
                success = false;
                continue;
            }
            if self.options.contains_key(flag) {
                let value = token::parse_value(raw, self.declared_type(flag), self.bool_policy);
                if value.is_empty() {
                    self.record(LogLevel::Warning, flag, "unable to parse the option from config file");
                    success = false;
                    continue;
                }
                self.values.insert(flag.to_string(), value);
                self.record(LogLevel::Info, flag, "value is loaded from config");
            } else {
                self.values
                    .insert(flag.to_string(), Value::Text(raw.to_string()));
                self.record(
                    LogLevel::Info,
                    flag,
                    "value is not defined in config, parsed as a string value",
                );
            }
        }
        success
    }

    #[cfg(feature = "json")]
    fn load_json(&mut self, content: &str) -> bool {
        match serde_json::from_str::<serde_json::Value>(content) {
            Ok(doc) => self.load_document(&doc),
            Err(e) => {
                self.record(LogLevel::Warning, "", &format!("unable to parse JSON: {e}"));
                false
            }
        }
    }

    #[cfg(feature = "toml")]
    fn load_toml(&mut self, content: &str) -> bool {
        match toml::from_str::<toml::Table>(content) {
            Ok(doc) => self.load_document(&doc),
            Err(e) => {
                self.record(LogLevel::Warning, "", &format!("unable to parse TOML: {e}"));
                false
            }
        }
    }

    #[cfg(any(feature = "json", feature = "toml"))]
    fn load_document<S: serde::Serialize>(&mut self, doc: &S) -> bool {
        let pairs = match flatten::flatten(doc) {
            Ok(pairs) => pairs,
            Err(e) => {
                self.record(LogLevel::Warning, "", &e.to_string());
                return false;
            }
        };
        let mut success = true;
        for (key, leaf) in pairs {
            if key.is_empty() {
                self.record(LogLevel::Warning, "", "config root is not an object");
                success = false;
                continue;
            }
            success &= self.merge_leaf(key, leaf);
        }
        success
    }

    /// Store one document scalar, coerced to the option's declared type.
    #[cfg(any(feature = "json", feature = "toml"))]
    fn merge_leaf(&mut self, key: String, leaf: Leaf) -> bool {
        let value = if self.options.contains_key(&key) {
            coerce_leaf(leaf, self.declared_type(&key))
        } else {
            native_leaf(leaf)
        };
        if value.is_empty() {
            self.record(
                LogLevel::Warning,
                &key,
                "unable to parse the option from config file",
            );
            return false;
        }
        self.record(LogLevel::Info, &key, "value is loaded from config");
        self.values.insert(key, value);
        true
    }
}

/// Document scalar to a value of the declared type. Integers accept any
/// number (floats truncate); numbers accept integers.
#[cfg(any(feature = "json", feature = "toml"))]
fn coerce_leaf(leaf: Leaf, data_type: DataType) -> Value {
    match (data_type, leaf) {
        (DataType::Int, Leaf::Int(i)) => Value::Int(i),
        (DataType::Int, Leaf::Float(f)) => Value::Int(f as i64),
        (DataType::Number, Leaf::Float(f)) => Value::Number(f),
        (DataType::Number, Leaf::Int(i)) => Value::Number(i as f64),
        (DataType::Bool, Leaf::Bool(b)) => Value::Bool(b),
        (DataType::Text, Leaf::Str(s)) => Value::Text(s),
        _ => Value::Absent,
    }
}

#[cfg(any(feature = "json", feature = "toml"))]
fn native_leaf(leaf: Leaf) -> Value {
    match leaf {
        Leaf::Int(i) => Value::Int(i),
        Leaf::Float(f) => Value::Number(f),
        Leaf::Bool(b) => Value::Bool(b),
        Leaf::Str(s) => Value::Text(s),
        Leaf::Null => Value::Absent,
    }
}
