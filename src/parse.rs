//! The parse pipeline: schema checks, defaults, config file, command line,
//! validation.
//!
//! Precedence is fixed: option defaults, then the file named by
//! `--config`/`-cfg`, then command-line values. Later sources overwrite
//! earlier ones key by key.

use std::path::Path;

use crate::config::{CONFIG_FLAG, CONFIG_SHORTFLAG, Config, HELP_FLAG};
use crate::error::OptfigError;
use crate::option::ConfigOption;
use crate::token::{self, TokenKind};
use crate::types::LogLevel;
use crate::value::{DataType, Value};

const FATAL_BANNER: &str = "Fatal Error: Option format validation failed, abort.";

/// The option a value token will be assigned to.
enum Cursor {
    /// A registered option, by canonical flag.
    Known(String),
    /// An unregistered long flag; its value is kept as text under the raw name.
    Stray(String),
}

impl Config {
    /// Parse command-line arguments. The first item is the program path and is
    /// only used for the executable name shown in help text.
    ///
    /// Fails when the option schema or the resolved values contain errors and
    /// the log threshold is not [`LogLevel::None`]. Malformed individual tokens
    /// are logged as warnings and skipped.
    pub fn parse<I, S>(&mut self, args: I) -> Result<(), OptfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        if let Some(program) = args.first() {
            self.exe_name = program
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(program)
                .to_string();
        }
        let args = args.get(1..).unwrap_or_default();
        tracing::debug!(exe = %self.exe_name, argc = args.len(), "optfig: parse");

        let format_level = self.check_format();
        if self.aborts_on(format_level) {
            self.report_fatal();
            return Err(OptfigError::InvalidFormat(format_level));
        }

        self.set_default_values();

        if self.load_config {
            for pair in args.windows(2) {
                let is_config_flag = pair[0] == format!("--{CONFIG_FLAG}")
                    || pair[0] == format!("-{CONFIG_SHORTFLAG}");
                if is_config_flag && token::classify(&pair[1]) == TokenKind::Value {
                    self.load_file(Path::new(&pair[1]));
                }
            }
        }

        self.apply_arguments(args);

        let help_requested = self
            .values
            .get(HELP_FLAG)
            .is_some_and(|v| matches!(v, Value::Bool(true)));
        if help_requested && self.auto_help {
            self.print_help();
        }

        let input_level = self.validate();
        if self.aborts_on(input_level) {
            self.report_fatal();
            return Err(OptfigError::InvalidInput(input_level));
        }
        tracing::debug!(values = self.values.len(), "optfig: parse complete");
        Ok(())
    }

    /// Check the option schema for declarations that cannot work.
    ///
    /// Errors: an optional option without a default, or a short flag shared
    /// with another option. Warnings: missing descriptions or short flags, and
    /// a missing program description. Returns the most severe level found.
    pub fn check_format(&mut self) -> LogLevel {
        let mut issues: Vec<(LogLevel, String, String)> = Vec::new();

        for opt in self.options.values() {
            let flag = opt.get_flag();
            if !opt.is_required() && opt.get_default().is_empty() {
                issues.push((
                    LogLevel::Error,
                    flag.to_string(),
                    "default value is not defined".into(),
                ));
            }
            let short = opt.get_shortflag();
            if !short.is_empty() {
                let collides = self
                    .options
                    .values()
                    .any(|other| other.get_flag() != flag && other.get_shortflag() == short);
                if collides {
                    issues.push((
                        LogLevel::Error,
                        flag.to_string(),
                        format!("duplicate short flags ({short})"),
                    ));
                }
            }
            if opt.get_description().is_empty() {
                issues.push((
                    LogLevel::Warning,
                    flag.to_string(),
                    "no description text for argument".into(),
                ));
            }
            if short.is_empty() {
                issues.push((
                    LogLevel::Warning,
                    flag.to_string(),
                    "no short flag is provided".into(),
                ));
            }
        }
        if self.description.is_empty() {
            issues.push((
                LogLevel::Warning,
                String::new(),
                "no program description text is provided".into(),
            ));
        }

        let mut worst = LogLevel::Info;
        for (level, token, message) in issues {
            worst = worst.max(level);
            self.record(level, &token, &message);
        }
        worst
    }

    /// Check the resolved values after parsing.
    ///
    /// Hidden option values are dropped first. Then every value that is still
    /// absent, and every visible option with no value at all, is an error.
    /// Returns the most severe level found.
    pub fn validate(&mut self) -> LogLevel {
        let hidden: Vec<String> = self
            .options
            .iter()
            .filter(|(_, o)| o.is_hidden())
            .map(|(flag, _)| flag.clone())
            .collect();
        for flag in &hidden {
            self.values.remove(flag);
        }

        let mut worst = LogLevel::Info;
        let absent: Vec<String> = self
            .values
            .iter()
            .filter(|(_, v)| v.is_empty())
            .map(|(k, _)| k.clone())
            .collect();
        for flag in absent {
            worst = LogLevel::Error;
            self.record(LogLevel::Error, &flag, "option contains invalid value");
        }

        let undefined: Vec<String> = self
            .options
            .iter()
            .filter(|(flag, o)| !o.is_hidden() && !self.values.contains_key(*flag))
            .map(|(flag, _)| flag.clone())
            .collect();
        for flag in undefined {
            worst = LogLevel::Error;
            self.record(LogLevel::Error, &flag, "option is undefined");
        }
        worst
    }

    fn aborts_on(&self, level: LogLevel) -> bool {
        level >= LogLevel::Error && self.log_level <= LogLevel::Error
    }

    fn report_fatal(&mut self) {
        let report = format!("{}\n{FATAL_BANNER}\n", self.log_text());
        self.emit(&report);
    }

    /// Clear the resolved values and start every option at its default.
    /// Options without a default start absent.
    fn set_default_values(&mut self) {
        self.values = self
            .options
            .iter()
            .map(|(flag, opt)| (flag.clone(), opt.get_default().clone()))
            .collect();
    }

    fn apply_arguments(&mut self, args: &[String]) {
        let mut cursor: Option<Cursor> = None;

        for arg in args {
            match token::classify(arg) {
                TokenKind::Unknown => {
                    self.record(LogLevel::Warning, arg, "unknown input");
                }
                kind @ (TokenKind::Flag | TokenKind::ShortFlag) => {
                    cursor = self.resolve_flag(arg, kind);
                    match &cursor {
                        Some(Cursor::Known(flag)) => {
                            if self.declared_type(flag) == DataType::Bool {
                                self.values.insert(flag.clone(), Value::Bool(true));
                            }
                        }
                        Some(Cursor::Stray(_)) | None => {
                            self.record(LogLevel::Warning, arg, "unrecognized flag");
                        }
                    }
                }
                TokenKind::Value => match cursor.take() {
                    Some(target) => self.assign(arg, target),
                    None => {
                        self.record(LogLevel::Warning, arg, "unassociated argument is not stored");
                    }
                },
            }
        }
    }

    fn assign(&mut self, raw: &str, target: Cursor) {
        let (flag, data_type) = match target {
            Cursor::Known(flag) => {
                let data_type = self.declared_type(&flag);
                (flag, data_type)
            }
            Cursor::Stray(flag) => (flag, DataType::Text),
        };
        let value = token::parse_value(raw, data_type, self.bool_policy);
        if value.is_empty() {
            self.record(LogLevel::Warning, raw, "invalid value type is provided");
        } else {
            self.values.insert(flag, value);
            self.record(LogLevel::Info, raw, "value parsed successfully");
        }
    }

    /// Declared type used for coercion. Options without a default are text.
    pub(crate) fn declared_type(&self, flag: &str) -> DataType {
        match self.options.get(flag).map(ConfigOption::data_type) {
            Some(DataType::Unknown) | None => DataType::Text,
            Some(t) => t,
        }
    }

    fn resolve_flag(&self, token: &str, kind: TokenKind) -> Option<Cursor> {
        match kind {
            TokenKind::Flag => {
                let name = &token[2..];
                if name.is_empty() {
                    return None;
                }
                if self.options.contains_key(name) {
                    Some(Cursor::Known(name.to_string()))
                } else {
                    Some(Cursor::Stray(name.to_string()))
                }
            }
            TokenKind::ShortFlag => {
                let name = self.translate_shortflag(&token[1..]);
                self.options
                    .contains_key(name)
                    .then(|| Cursor::Known(name.to_string()))
            }
            TokenKind::Unknown | TokenKind::Value => None,
        }
    }

    /// Map a short alias to its canonical flag, falling back to the alias
    /// itself when no option declares it.
    fn translate_shortflag<'a>(&'a self, short: &'a str) -> &'a str {
        self.options
            .values()
            .find(|o| !short.is_empty() && o.get_shortflag() == short)
            .map(ConfigOption::get_flag)
            .unwrap_or(short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{SharedBuffer, quiet_config, sample_config};
    use crate::types::BoolPolicy;

    fn has_entry(config: &Config, level: LogLevel, token: &str) -> bool {
        config
            .log_entries()
            .iter()
            .any(|e| e.level == level && e.token == token)
    }

    #[test]
    fn long_flags_resolve_values() {
        let mut config = sample_config();
        config
            .parse(["prog", "--name", "alice", "--count", "5"])
            .unwrap();
        assert_eq!(config.get("name"), Some(&Value::Text("alice".into())));
        assert_eq!(config.get("count"), Some(&Value::Int(5)));
    }

    #[test]
    fn missing_required_option_fails() {
        let mut config = sample_config();
        let result = config.parse(["prog", "--count", "5"]);
        assert!(matches!(
            result,
            Err(OptfigError::InvalidInput(LogLevel::Error))
        ));
        assert!(has_entry(&config, LogLevel::Error, "name"));
    }

    #[test]
    fn bare_bool_flag_is_true() {
        let mut config = sample_config();
        config.parse(["prog", "--name", "x", "--verbose"]).unwrap();
        assert_eq!(config.get("verbose"), Some(&Value::Bool(true)));
    }

    #[test]
    fn bool_flag_takes_explicit_false() {
        let mut config = sample_config();
        config
            .parse(["prog", "--verbose", "false", "--name", "x"])
            .unwrap();
        assert_eq!(config.get("verbose"), Some(&Value::Bool(false)));
    }

    #[test]
    fn defaults_fill_unset_options() {
        let mut config = sample_config();
        config.parse(["prog", "--name", "x"]).unwrap();
        assert_eq!(config.get("count"), Some(&Value::Int(1)));
        assert_eq!(config.get("ratio"), Some(&Value::Number(0.5)));
        assert_eq!(config.get("verbose"), Some(&Value::Bool(false)));
    }

    #[test]
    fn short_flags_resolve() {
        let mut config = sample_config();
        config.parse(["/usr/bin/prog", "-n", "bob", "-c", "9"]).unwrap();
        assert_eq!(config.get("name"), Some(&Value::Text("bob".into())));
        assert_eq!(config.get("count"), Some(&Value::Int(9)));
        assert_eq!(config.exe_name(), "prog");
    }

    #[test]
    fn negative_numbers_are_values() {
        let mut config = sample_config();
        config
            .parse(["prog", "--name", "x", "--count", "-4", "--ratio", "-0.25"])
            .unwrap();
        assert_eq!(config.get("count"), Some(&Value::Int(-4)));
        assert_eq!(config.get("ratio"), Some(&Value::Number(-0.25)));
    }

    #[test]
    fn command_line_wins_over_default_on_repeat() {
        let mut config = sample_config();
        config
            .parse(["prog", "--name", "x", "--count", "2", "--count", "3"])
            .unwrap();
        assert_eq!(config.get("count"), Some(&Value::Int(3)));
    }

    #[test]
    fn bad_value_keeps_default_and_warns() {
        let mut config = sample_config();
        config
            .parse(["prog", "--name", "x", "--count", "lots"])
            .unwrap();
        assert_eq!(config.get("count"), Some(&Value::Int(1)));
        assert!(has_entry(&config, LogLevel::Warning, "lots"));
    }

    #[test]
    fn stray_value_is_discarded() {
        let mut config = sample_config();
        config.parse(["prog", "orphan", "--name", "x"]).unwrap();
        assert!(has_entry(&config, LogLevel::Warning, "orphan"));
        assert!(config.values().all(|(_, v)| v != &Value::Text("orphan".into())));
    }

    #[test]
    fn unknown_long_flag_captures_text() {
        let mut config = sample_config();
        config
            .parse(["prog", "--name", "x", "--extra", "42"])
            .unwrap();
        assert!(has_entry(&config, LogLevel::Warning, "--extra"));
        assert_eq!(config.get("extra"), Some(&Value::Text("42".into())));
    }

    #[test]
    fn unknown_short_flag_is_dropped() {
        let mut config = sample_config();
        config.parse(["prog", "-z", "1", "--name", "x"]).unwrap();
        assert!(has_entry(&config, LogLevel::Warning, "-z"));
        assert!(has_entry(&config, LogLevel::Warning, "1"));
        assert!(!config.contains("z"));
    }

    #[test]
    fn hidden_values_are_purged() {
        let buf = SharedBuffer::default();
        let mut config = sample_config();
        config.output(buf.clone());
        config.parse(["prog", "--name", "x", "-h"]).unwrap();
        assert!(!config.contains("help"));
        assert!(!config.contains("config"));
        assert!(buf.contents().contains("USAGE"));
    }

    #[test]
    fn help_not_printed_when_disabled() {
        let buf = SharedBuffer::default();
        let mut config = sample_config();
        config.output(buf.clone()).enable_help(false);
        config.parse(["prog", "--name", "x", "--help"]).unwrap();
        assert!(!buf.contents().contains("USAGE"));
        assert!(!config.contains("help"));
    }

    #[test]
    fn duplicate_short_flag_is_error() {
        let mut config = quiet_config();
        config.option("alpha").shortflag("a").default_value(1);
        config.option("another").shortflag("a").default_value(2);
        assert_eq!(config.check_format(), LogLevel::Error);
        assert!(has_entry(&config, LogLevel::Error, "alpha"));
        assert!(has_entry(&config, LogLevel::Error, "another"));
    }

    #[test]
    fn optional_without_default_is_error() {
        let mut config = quiet_config();
        config.option("orphan").shortflag("o").description("no default");
        assert_eq!(config.check_format(), LogLevel::Error);
    }

    #[test]
    fn missing_descriptions_are_warnings() {
        let mut config = Config::new();
        config.option("count").default_value(1);
        assert_eq!(config.check_format(), LogLevel::Warning);
        assert!(has_entry(&config, LogLevel::Warning, "count"));
        assert!(has_entry(&config, LogLevel::Warning, ""));
    }

    #[test]
    fn clean_schema_is_info() {
        let mut config = quiet_config();
        config
            .option("count")
            .shortflag("c")
            .description("How many")
            .default_value(1);
        assert_eq!(config.check_format(), LogLevel::Info);
    }

    #[test]
    fn format_error_aborts_before_tokens() {
        let buf = SharedBuffer::default();
        let mut config = quiet_config();
        config.output(buf.clone());
        config.option("alpha").shortflag("a").default_value(1);
        config.option("beta").shortflag("a").default_value(2);
        let result = config.parse(["prog", "--alpha", "7"]);
        assert!(matches!(result, Err(OptfigError::InvalidFormat(_))));
        assert!(!config.contains("alpha"));
        assert!(buf.contents().contains("Fatal Error"));
    }

    #[test]
    fn threshold_none_never_aborts() {
        let mut config = sample_config();
        config.log_level(LogLevel::None);
        config.parse(["prog", "--count", "5"]).unwrap();
        assert!(config.log_entries().is_empty());
        assert_eq!(config.get("name"), Some(&Value::Absent));
    }

    #[test]
    fn required_option_falls_back_to_default() {
        let mut config = quiet_config();
        config
            .option("mode")
            .shortflag("m")
            .description("Run mode")
            .default_value("fast")
            .required(true);
        config.parse(["prog"]).unwrap();
        assert_eq!(config.get("mode"), Some(&Value::Text("fast".into())));
    }

    #[test]
    fn renamed_option_validates_under_registry_key() {
        let mut config = quiet_config();
        config
            .option("a")
            .flag("b")
            .shortflag("a")
            .description("renamed")
            .default_value(1);
        config.parse(["prog"]).unwrap();
        assert_eq!(config.get("a"), Some(&Value::Int(1)));
        assert!(!has_entry(&config, LogLevel::Error, "b"));
    }

    #[test]
    fn threshold_none_ignores_schema_errors() {
        let mut config = quiet_config();
        config.log_level(LogLevel::None);
        config.option("alpha").shortflag("a").description("x").default_value(1);
        config.option("beta").shortflag("a").description("y").default_value(2);
        config.parse(["prog", "--alpha", "7"]).unwrap();
        assert_eq!(config.get("alpha"), Some(&Value::Int(7)));
        assert_eq!(config.get("beta"), Some(&Value::Int(2)));
        assert!(config.log_entries().is_empty());
    }

    #[test]
    fn validate_reports_undefined_options() {
        let mut config = quiet_config();
        config.option("count").shortflag("c").description("n").default_value(1);
        assert_eq!(config.validate(), LogLevel::Error);
        assert!(has_entry(&config, LogLevel::Error, "count"));
    }

    #[test]
    fn strict_bools_reject_garbage() {
        let mut config = sample_config();
        config.bool_policy(BoolPolicy::Strict);
        config
            .parse(["prog", "--name", "x", "--verbose", "xyz123"])
            .unwrap();
        // The flag itself still switches the option on.
        assert_eq!(config.get("verbose"), Some(&Value::Bool(true)));
        assert!(has_entry(&config, LogLevel::Warning, "xyz123"));
    }

    #[test]
    fn empty_token_is_warning() {
        let mut config = sample_config();
        config.parse(["prog", "", "--name", "x"]).unwrap();
        assert!(has_entry(&config, LogLevel::Warning, ""));
    }

    #[test]
    fn required_without_default_is_text() {
        let mut config = quiet_config();
        config
            .option("token")
            .shortflag("t")
            .description("API token")
            .required(true);
        config.parse(["prog", "-t", "abc"]).unwrap();
        assert_eq!(config.get("token"), Some(&Value::Text("abc".into())));
    }
}
