//! Write the resolved configuration back out.
//!
//! CSV is one `flag,value` line per entry. JSON and TOML rebuild nested
//! objects from dotted keys, the inverse of the flattening done on load:
//! `a.b.c = 1` becomes `{"a": {"b": {"c": 1}}}`. Hidden options and absent
//! values are never written.

use std::path::Path;

use crate::config::Config;
use crate::error::OptfigError;
use crate::types::FileFormat;
use crate::value::Value;

impl Config {
    /// Serialize the resolved values and, if `path` is given, write them there.
    ///
    /// A recognized extension on `path` overrides `format`. Write failures are
    /// returned as [`OptfigError::IoError`].
    pub fn serialize(
        &self,
        path: Option<&Path>,
        format: FileFormat,
        pretty: bool,
    ) -> Result<String, OptfigError> {
        let format = path.and_then(FileFormat::from_path).unwrap_or(format);
        let text = self.to_string(format, pretty);
        if let Some(path) = path {
            std::fs::write(path, &text).map_err(|e| OptfigError::IoError {
                path: path.to_path_buf(),
                source: e,
            })?;
            tracing::debug!(path = %path.display(), %format, "optfig: configuration written");
        }
        Ok(text)
    }

    /// Serialize the resolved values without touching the filesystem.
    pub fn to_string(&self, format: FileFormat, pretty: bool) -> String {
        match format {
            #[cfg(feature = "json")]
            FileFormat::Json => self.to_json(pretty),
            FileFormat::Csv => self.to_csv(),
            #[cfg(feature = "toml")]
            FileFormat::Toml => self.to_toml(pretty),
        }
    }

    /// Resolved values that belong in output: visible and present.
    pub(crate) fn visible_values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values()
            .filter(|(flag, value)| !value.is_empty() && !self.is_hidden(flag))
    }

    fn to_csv(&self) -> String {
        let mut out = String::new();
        for (flag, value) in self.visible_values() {
            out.push_str(flag);
            out.push(',');
            out.push_str(&raw_text(value));
            out.push('\n');
        }
        out
    }

    #[cfg(feature = "json")]
    fn to_json(&self, pretty: bool) -> String {
        let mut root = serde_json::Map::new();
        for (flag, value) in self.visible_values() {
            let Ok(json) = serde_json::to_value(value) else {
                continue;
            };
            if !set_nested_json(&mut root, flag, json) {
                tracing::warn!(key = flag, "optfig: key path conflicts with a scalar, skipped");
            }
        }
        let doc = serde_json::Value::Object(root);
        let text = if pretty {
            serde_json::to_string_pretty(&doc)
        } else {
            serde_json::to_string(&doc)
        };
        text.unwrap_or_default()
    }

    #[cfg(feature = "toml")]
    fn to_toml(&self, pretty: bool) -> String {
        let mut root = toml::Table::new();
        for (flag, value) in self.visible_values() {
            let Ok(item) = toml::Value::try_from(value) else {
                continue;
            };
            if !set_nested_toml(&mut root, flag, item) {
                tracing::warn!(key = flag, "optfig: key path conflicts with a scalar, skipped");
            }
        }
        let text = if pretty {
            toml::to_string_pretty(&root)
        } else {
            toml::to_string(&root)
        };
        text.unwrap_or_default()
    }
}

/// Unquoted text form used for CSV cells. Numbers use the shortest form that
/// parses back to the same value.
fn raw_text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.print(),
    }
}

/// Insert `value` at a dotted path, creating intermediate objects. Returns
/// false if an intermediate segment already holds a non-object.
#[cfg(feature = "json")]
fn set_nested_json(
    root: &mut serde_json::Map<String, serde_json::Value>,
    dotted_key: &str,
    value: serde_json::Value,
) -> bool {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };
    let mut current = root;
    if let Some(path) = path {
        for segment in path.split('.') {
            let entry = current
                .entry(segment)
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            match entry.as_object_mut() {
                Some(obj) => current = obj,
                None => return false,
            }
        }
    }
    if current.get(leaf).is_some_and(|v| v.is_object()) {
        return false;
    }
    current.insert(leaf.to_string(), value);
    true
}

#[cfg(feature = "toml")]
fn set_nested_toml(root: &mut toml::Table, dotted_key: &str, value: toml::Value) -> bool {
    let (path, leaf) = match dotted_key.rsplit_once('.') {
        Some((p, l)) => (Some(p), l),
        None => (None, dotted_key),
    };
    let mut current = root;
    if let Some(path) = path {
        for segment in path.split('.') {
            let entry = current
                .entry(segment)
                .or_insert_with(|| toml::Value::Table(toml::Table::new()));
            match entry.as_table_mut() {
                Some(tbl) => current = tbl,
                None => return false,
            }
        }
    }
    if current.get(leaf).is_some_and(|v| v.is_table()) {
        return false;
    }
    current.insert(leaf.to_string(), value);
    true
}
