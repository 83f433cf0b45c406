//! Typed command-line options and config files for small programs. Declare
//! your options, hand over `argv`, and read typed values back.
//!
//! ```ignore
//! let mut config = optfig::Config::new();
//! config.description("Resize images in place");
//! config.option("width").shortflag("w").description("Target width").default_value(800);
//! config.option("input").shortflag("i").description("Source file").required(true);
//! config.parse(std::env::args())?;
//!
//! let width = config.get("width").map(|v| v.as_int()).transpose()?;
//! ```
//!
//! Options are identified by a canonical long flag (`--width`) and an optional
//! short alias (`-w`). An option's default fixes its type: `Int`, `Number`,
//! `Bool` or `Text`. Tokens are coerced to that type as they are parsed.
//!
//! # Precedence
//!
//! Values are resolved in three layers, later layers overwriting earlier ones
//! key by key:
//!
//! | Priority   | Source                                         |
//! |------------|------------------------------------------------|
//! | 1 (lowest) | Option defaults                                |
//! | 2          | The file named by `--config <path>` / `-cfg`   |
//! | 3 (highest)| Command-line arguments                         |
//!
//! A required option with no default must be supplied by the file or the
//! command line, otherwise [`Config::parse`] fails.
//!
//! # Config files
//!
//! | Format | Extension | Shape                                               |
//! |--------|-----------|-----------------------------------------------------|
//! | CSV    | `.csv`    | one `flag,value` line per option                    |
//! | JSON   | `.json`   | an object; nested objects address `a.b.c` flags     |
//! | TOML   | `.toml`   | a table; nested tables address `a.b.c` flags        |
//!
//! The same formats can be written back with [`Config::serialize`]. Nested
//! output rebuilds objects from dotted keys, so `server.port` round-trips as
//! `{"server": {"port": 80}}`.
//!
//! # Diagnostics
//!
//! Parsing never panics on bad input. Every problem is recorded as a
//! [`LogEntry`] with a [`LogLevel`]; malformed tokens are warnings and are
//! skipped. Errors (an impossible option schema, a missing required value)
//! abort the parse unless the threshold is [`LogLevel::None`]. Entries are
//! also emitted as `tracing` events, so a subscriber sees them without any
//! extra wiring.
//!
//! # Features
//!
//! - **`json`** (default): JSON config files via `serde_json`.
//! - **`toml`** (default): TOML config files via `toml`.
//!
//! CSV is always available.
//!
//! # Threading
//!
//! A [`Config`] is plain owned state. It is `Send` and can be moved between
//! threads or put behind a `Mutex`, but it does no synchronization itself.

pub mod error;
pub mod types;

mod config;
mod file;
#[cfg(any(feature = "json", feature = "toml"))]
mod flatten;
mod option;
mod parse;
mod render;
mod serialize;
mod token;
mod value;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use error::OptfigError;
pub use option::ConfigOption;
pub use token::{TokenKind, classify, parse_value};
pub use types::{BoolPolicy, FileFormat, LogEntry, LogLevel};
pub use value::{DataType, Value};
