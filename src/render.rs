//! Text output: help, usage, the resolved configuration table, and the log.
//!
//! The `*_text` methods are pure and return a `String`. The `print_*` and
//! `write_log` methods send the same text to the configured output sink.

use std::fmt::Write as _;
use std::io::Write;

use crate::config::Config;

const USAGE_WIDTH: usize = 80;
const TABLE_RULE: &str =
    "|-------------------------|------------|--------------------------------------------------|";

fn section(out: &mut String, title: &str) {
    let _ = write!(out, "\n[[[  {title}  ]]]\n\n");
}

impl Config {
    /// One-line-per-option usage summary, wrapped at 80 columns.
    pub fn usage_text(&self) -> String {
        let mut out = String::new();
        section(&mut out, "USAGE");
        let exe = if self.exe_name.is_empty() {
            "<executable>"
        } else {
            &self.exe_name
        };
        let lead = format!("    {exe} ");
        out.push_str(&lead);

        let mut line_width = 0;
        for opt in self.options.values() {
            let (dashes, name) = if opt.get_shortflag().is_empty() {
                ("--", opt.get_flag())
            } else {
                ("-", opt.get_shortflag())
            };
            let data_type = self.declared_type(opt.get_flag());
            let tag = if opt.is_required() {
                format!("{dashes}{name} <{data_type}>")
            } else {
                format!("[{dashes}{name} <{data_type}>]")
            };
            if line_width + tag.len() >= USAGE_WIDTH.saturating_sub(1 + lead.len()) {
                let _ = write!(out, "\n{:width$}", "", width = lead.len());
                line_width = 0;
            }
            out.push_str(&tag);
            out.push(' ');
            line_width += tag.len();
        }
        out.push_str("\n\n");
        out
    }

    /// Program description, usage, and a block per option with its short
    /// flag, required marker, description and default.
    pub fn help_text(&self) -> String {
        let mut out = String::new();
        if !self.description.is_empty() {
            out.push('\n');
            if !self.exe_name.is_empty() {
                let _ = write!(out, "[[[  {}  ]]]\n\n    ", self.exe_name);
            }
            let _ = write!(out, "{}\n\n", self.description);
        }
        out.push_str(&self.usage_text());
        section(&mut out, "HELP");
        for opt in self.options.values() {
            out.push_str("    ");
            if !opt.get_shortflag().is_empty() {
                let _ = write!(out, "-{}, ", opt.get_shortflag());
            }
            let _ = write!(out, "--{} ", opt.get_flag());
            if opt.is_required() {
                out.push_str("<REQUIRED>");
            }
            out.push_str("\n        ");
            if !opt.get_description().is_empty() {
                let _ = write!(out, "{} ", opt.get_description());
            }
            if !opt.get_default().is_empty() && !opt.is_hidden() {
                let _ = write!(out, " ( DEFAULT = {} ) ", opt.get_default().print());
            }
            out.push_str("\n\n");
        }
        out
    }

    /// Table of resolved values. Values captured from unknown flags or file
    /// keys have their type marked with `*`.
    pub fn table_text(&self) -> String {
        let mut out = String::new();
        section(&mut out, "CONFIGURATION");
        let _ = writeln!(out, "{TABLE_RULE}");
        let _ = writeln!(
            out,
            "|           NAME          |    TYPE    |                     VALUE                        |"
        );
        let _ = writeln!(out, "{TABLE_RULE}");
        for (flag, value) in self.values() {
            if self.is_hidden(flag) {
                continue;
            }
            let type_name = if self.options.contains_key(flag) {
                value.print_type().to_string()
            } else {
                format!("{}*", value.print_type())
            };
            let _ = writeln!(out, "| {flag:<23} | {type_name:<10} | {:<48} |", value.print());
        }
        let _ = writeln!(out, "{TABLE_RULE}");
        out.push('\n');
        out
    }

    /// Every recorded log entry, one per line, under a `PARSE LOG` header.
    pub fn log_text(&self) -> String {
        let mut out = String::new();
        section(&mut out, "PARSE LOG");
        for entry in &self.log {
            let _ = writeln!(out, "{entry}");
        }
        out
    }

    pub fn print_help(&mut self) {
        let text = self.help_text();
        self.emit(&text);
    }

    pub fn print_usage(&mut self) {
        let text = self.usage_text();
        self.emit(&text);
    }

    pub fn print_table(&mut self) {
        let text = self.table_text();
        self.emit(&text);
    }

    pub fn write_log(&mut self) {
        let text = self.log_text();
        self.emit(&text);
    }

    /// Write to the output sink. Failures are logged, never returned.
    pub(crate) fn emit(&mut self, text: &str) {
        if let Err(e) = self.output.write_all(text.as_bytes()) {
            tracing::warn!(error = %e, "optfig: failed to write to output sink");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures::test::{SharedBuffer, sample_config};
    use crate::value::Value;

    #[test]
    fn usage_lists_options() {
        let mut config = sample_config();
        config.output(std::io::sink());
        config.parse(["bin/demo", "--name", "x"]).unwrap();
        let usage = config.usage_text();
        assert!(usage.contains("demo"));
        assert!(usage.contains(" -n <STRING>"));
        assert!(!usage.contains("[-n"));
        assert!(usage.contains("[-c <INT>]"));
        assert!(usage.contains("[-h <BOOLEAN>]"));
    }

    #[test]
    fn usage_without_exe_name_uses_placeholder() {
        let config = sample_config();
        assert!(config.usage_text().contains("<executable>"));
    }

    #[test]
    fn usage_wraps_long_lines() {
        let mut config = sample_config();
        for i in 0..12 {
            config
                .option(&format!("option_number_{i}"))
                .default_value(i);
        }
        let usage = config.usage_text();
        assert!(usage.lines().all(|l| l.len() < 100));
    }

    #[test]
    fn help_shows_descriptions_and_defaults() {
        let config = sample_config();
        let help = config.help_text();
        assert!(help.contains("A sample program"));
        assert!(help.contains("-c, --count"));
        assert!(help.contains("How many times"));
        assert!(help.contains("DEFAULT = 1"));
        assert!(help.contains("--name <REQUIRED>"));
    }

    #[test]
    fn help_hides_defaults_of_hidden_options() {
        let config = sample_config();
        let help = config.help_text();
        let help_block = help.split("--help").nth(1).unwrap();
        let first_block = help_block.split("\n\n").next().unwrap();
        assert!(!first_block.contains("DEFAULT"));
    }

    #[test]
    fn table_marks_stray_values() {
        let mut config = sample_config();
        config
            .parse(["prog", "--name", "x", "--extra", "yes"])
            .unwrap();
        let table = config.table_text();
        assert!(table.contains("STRING*"));
        assert!(table.contains("| count"));
        assert!(!table.contains("| help"));
    }

    #[test]
    fn log_text_lists_entries() {
        let mut config = sample_config();
        config.parse(["prog", "stray", "--name", "x"]).unwrap();
        let log = config.log_text();
        assert!(log.contains("PARSE LOG"));
        assert!(log.contains("Input \"stray\""));
    }

    #[test]
    fn print_methods_write_to_sink() {
        let buf = SharedBuffer::default();
        let mut config = sample_config();
        config.output(buf.clone());
        *config.value_mut("count") = Value::Int(3);
        config.print_table();
        config.print_usage();
        config.write_log();
        let out = buf.contents();
        assert!(out.contains("CONFIGURATION"));
        assert!(out.contains("USAGE"));
        assert!(out.contains("PARSE LOG"));
    }
}
