use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::OptfigError;

/// Severity of a diagnostic entry, and the threshold below which entries are
/// dropped.
///
/// Ordering is significant: `Info < Warning < Error < None`. A threshold of
/// `None` records nothing and disables aborting on errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Info,
    #[default]
    Warning,
    Error,
    None,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
            LogLevel::None => "NONE",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded diagnostic: the offending input and what went wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub token: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<<<{:>9}>>> Input \"{}\" : {}",
            self.level.as_str(),
            self.token,
            self.message
        )
    }
}

/// Config file format, used both for loading and for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    #[cfg(feature = "json")]
    Json,
    Csv,
    #[cfg(feature = "toml")]
    Toml,
}

impl Default for FileFormat {
    #[cfg(feature = "json")]
    fn default() -> Self {
        FileFormat::Json
    }

    #[cfg(not(feature = "json"))]
    fn default() -> Self {
        FileFormat::Csv
    }
}

impl FileFormat {
    /// Detect the format from a path's extension. Returns `None` when the path
    /// has no extension or the extension is not one of the compiled-in formats.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            #[cfg(feature = "json")]
            FileFormat::Json => "json",
            FileFormat::Csv => "csv",
            #[cfg(feature = "toml")]
            FileFormat::Toml => "toml",
        }
    }
}

impl FromStr for FileFormat {
    type Err = OptfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[cfg(feature = "json")]
        if s.eq_ignore_ascii_case("json") {
            return Ok(FileFormat::Json);
        }
        #[cfg(feature = "toml")]
        if s.eq_ignore_ascii_case("toml") {
            return Ok(FileFormat::Toml);
        }
        if s.eq_ignore_ascii_case("csv") {
            return Ok(FileFormat::Csv);
        }
        Err(OptfigError::UnknownFormat(s.to_string()))
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How `Bool` options coerce raw tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoolPolicy {
    /// `false`/`f` (any case) is false, every other token is true.
    #[default]
    Permissive,
    /// Only `true`/`t`/`false`/`f` (any case) are accepted; anything else fails.
    Strict,
}
