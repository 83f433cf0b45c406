//! The `Config` engine: option registry, resolved values, diagnostics and
//! runtime settings.
//!
//! The parse pipeline lives in [`parse`](crate::parse), file loading in
//! [`file`](crate::file), output in [`serialize`](crate::serialize) and
//! [`render`](crate::render). All of them operate on the state defined here.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use crate::option::ConfigOption;
use crate::types::{BoolPolicy, LogEntry, LogLevel};
use crate::value::Value;

pub(crate) const HELP_FLAG: &str = "help";
pub(crate) const HELP_SHORTFLAG: &str = "h";
pub(crate) const CONFIG_FLAG: &str = "config";
pub(crate) const CONFIG_SHORTFLAG: &str = "cfg";

/// Typed option registry plus the values resolved from defaults, config files
/// and command-line arguments.
///
/// A `Config` is single-owner mutable state. It is `Send`, so it may be moved
/// to another thread or wrapped in a `Mutex`, but it does no locking itself.
pub struct Config {
    pub(crate) options: BTreeMap<String, ConfigOption>,
    pub(crate) values: BTreeMap<String, Value>,
    pub(crate) log: Vec<LogEntry>,
    pub(crate) verbose: bool,
    pub(crate) log_level: LogLevel,
    pub(crate) exe_name: String,
    pub(crate) description: String,
    pub(crate) auto_help: bool,
    pub(crate) load_config: bool,
    pub(crate) bool_policy: BoolPolicy,
    pub(crate) output: Box<dyn Write + Send>,
}

impl Config {
    /// Create a config with only the reserved `help` and `config` options.
    pub fn new() -> Self {
        let mut config = Self {
            options: BTreeMap::new(),
            values: BTreeMap::new(),
            log: Vec::new(),
            verbose: false,
            log_level: LogLevel::default(),
            exe_name: String::new(),
            description: String::new(),
            auto_help: true,
            load_config: true,
            bool_policy: BoolPolicy::default(),
            output: Box::new(std::io::stdout()),
        };
        config.enable_help(true);
        config.enable_config(true);
        config
    }

    /// Register an option, or return the existing one if `flag` is already
    /// registered. Re-registering never resets an option's settings.
    pub fn option(&mut self, flag: &str) -> &mut ConfigOption {
        self.options
            .entry(flag.to_string())
            .or_insert_with(|| ConfigOption::new(flag))
    }

    /// Remove an option from the schema. Returns whether it existed.
    pub fn remove(&mut self, flag: &str) -> bool {
        self.options.remove(flag).is_some()
    }

    pub fn get_option(&self, flag: &str) -> Option<&ConfigOption> {
        self.options.get(flag)
    }

    /// All registered options, ordered by canonical flag.
    pub fn options(&self) -> impl Iterator<Item = &ConfigOption> {
        self.options.values()
    }

    /// Whether a resolved value exists for `flag`. Meaningful after parsing.
    pub fn contains(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    pub fn get(&self, flag: &str) -> Option<&Value> {
        self.values.get(flag)
    }

    /// Mutable access to a resolved value, inserting `Value::Absent` if the
    /// key is not present yet.
    pub fn value_mut(&mut self, flag: &str) -> &mut Value {
        self.values.entry(flag.to_string()).or_default()
    }

    /// All resolved values, ordered by key.
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Toggle the reserved `--help`/`-h` option and the help text it triggers.
    pub fn enable_help(&mut self, enabled: bool) -> &mut Self {
        self.auto_help = enabled;
        if enabled {
            if !self.options.contains_key(HELP_FLAG) {
                self.option(HELP_FLAG)
                    .shortflag(HELP_SHORTFLAG)
                    .default_value(false)
                    .description("Display the help message")
                    .required(false)
                    .hidden(true);
            }
        } else {
            self.options.remove(HELP_FLAG);
        }
        self
    }

    /// Toggle the reserved `--config`/`-cfg` option that loads a config file
    /// before command-line values are applied.
    pub fn enable_config(&mut self, enabled: bool) -> &mut Self {
        self.load_config = enabled;
        if enabled {
            if !self.options.contains_key(CONFIG_FLAG) {
                self.option(CONFIG_FLAG)
                    .shortflag(CONFIG_SHORTFLAG)
                    .default_value("")
                    .description("Input configuration file (JSON/CSV/TOML)")
                    .required(false)
                    .hidden(true);
            }
        } else {
            self.options.remove(CONFIG_FLAG);
        }
        self
    }

    /// Short description of the program, shown at the top of the help text.
    pub fn description(&mut self, description: &str) -> &mut Self {
        self.description = description.to_string();
        self
    }

    /// Stream every recorded log entry to the output sink as it happens.
    pub fn verbose(&mut self, verbose: bool) -> &mut Self {
        self.verbose = verbose;
        self
    }

    /// Minimum level an entry needs to be recorded. `LogLevel::None` records
    /// nothing and never aborts a parse.
    pub fn log_level(&mut self, level: LogLevel) -> &mut Self {
        self.log_level = level;
        self
    }

    pub fn bool_policy(&mut self, policy: BoolPolicy) -> &mut Self {
        self.bool_policy = policy;
        self
    }

    /// Destination for help, usage, verbose log lines and fatal reports.
    /// Defaults to stdout.
    pub fn output<W: Write + Send + 'static>(&mut self, sink: W) -> &mut Self {
        self.output = Box::new(sink);
        self
    }

    /// Executable name taken from the first argument of the last `parse`.
    pub fn exe_name(&self) -> &str {
        &self.exe_name
    }

    pub fn program_description(&self) -> &str {
        &self.description
    }

    pub fn log_entries(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Record a diagnostic if it meets the threshold.
    pub(crate) fn record(&mut self, level: LogLevel, token: &str, message: &str) {
        match level {
            LogLevel::Info => tracing::debug!(token, message, "optfig"),
            LogLevel::Warning => tracing::warn!(token, message, "optfig"),
            LogLevel::Error => tracing::error!(token, message, "optfig"),
            LogLevel::None => {}
        }
        if level < self.log_level {
            return;
        }
        let entry = LogEntry {
            level,
            token: token.to_string(),
            message: message.to_string(),
        };
        if self.verbose {
            self.emit(&format!("{entry}\n"));
        }
        self.log.push(entry);
    }

    /// Whether an option is hidden. Unknown keys are not.
    pub(crate) fn is_hidden(&self, flag: &str) -> bool {
        self.options.get(flag).is_some_and(|o| o.is_hidden())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("options", &self.options)
            .field("values", &self.values)
            .field("log", &self.log)
            .field("verbose", &self.verbose)
            .field("log_level", &self.log_level)
            .field("exe_name", &self.exe_name)
            .field("description", &self.description)
            .field("auto_help", &self.auto_help)
            .field("load_config", &self.load_config)
            .field("bool_policy", &self.bool_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::SharedBuffer;
    use crate::value::DataType;

    #[test]
    fn new_registers_reserved_options() {
        let config = Config::new();
        let help = config.get_option("help").unwrap();
        assert_eq!(help.get_shortflag(), "h");
        assert_eq!(help.data_type(), DataType::Bool);
        assert!(help.is_hidden());
        let cfg = config.get_option("config").unwrap();
        assert_eq!(cfg.get_shortflag(), "cfg");
        assert_eq!(cfg.data_type(), DataType::Text);
        assert!(cfg.is_hidden());
    }

    #[test]
    fn option_is_idempotent() {
        let mut config = Config::new();
        config.option("count").default_value(1).shortflag("c");
        let again = config.option("count");
        assert_eq!(again.get_default(), &Value::Int(1));
        assert_eq!(again.get_shortflag(), "c");
    }

    #[test]
    fn remove_reports_existence() {
        let mut config = Config::new();
        config.option("count").default_value(1);
        assert!(config.remove("count"));
        assert!(!config.remove("count"));
        assert!(config.get_option("count").is_none());
    }

    #[test]
    fn disabling_reserved_options_removes_them() {
        let mut config = Config::new();
        config.enable_help(false).enable_config(false);
        assert!(config.get_option("help").is_none());
        assert!(config.get_option("config").is_none());
        config.enable_help(true);
        assert!(config.get_option("help").is_some());
        assert!(config.get_option("config").is_none());
    }

    #[test]
    fn contains_looks_at_values_not_schema() {
        let mut config = Config::new();
        config.option("count").default_value(1);
        assert!(!config.contains("count"));
        *config.value_mut("count") = Value::Int(2);
        assert!(config.contains("count"));
        assert_eq!(config.get("count"), Some(&Value::Int(2)));
    }

    #[test]
    fn value_mut_inserts_absent() {
        let mut config = Config::new();
        assert!(config.value_mut("missing").is_empty());
        assert!(config.contains("missing"));
    }

    #[test]
    fn record_respects_threshold() {
        let mut config = Config::new();
        config.log_level(LogLevel::Warning);
        config.record(LogLevel::Info, "x", "ignored");
        config.record(LogLevel::Warning, "y", "kept");
        assert_eq!(config.log_entries().len(), 1);
        assert_eq!(config.log_entries()[0].token, "y");

        config.log_level(LogLevel::None);
        config.record(LogLevel::Error, "z", "suppressed");
        assert_eq!(config.log_entries().len(), 1);
    }

    #[test]
    fn verbose_streams_entries() {
        let buf = SharedBuffer::default();
        let mut config = Config::new();
        config.output(buf.clone()).verbose(true);
        config.record(LogLevel::Warning, "--bogus", "unrecognized flag");
        assert!(buf.contents().contains("unrecognized flag"));
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_sink_does_not_lose_entries() {
        let mut config = Config::new();
        config.output(BrokenSink).verbose(true);
        config.record(LogLevel::Warning, "--bogus", "unrecognized flag");
        assert_eq!(config.log_entries().len(), 1);
    }
}
