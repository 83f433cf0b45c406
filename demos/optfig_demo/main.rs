//! # optfig demo application
//!
//! A small CLI that declares a handful of options, parses `argv`, and prints
//! the resolved configuration table. It exists to exercise optfig by hand.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example optfig_demo -- --host example.org -p 8080
//! cargo run --example optfig_demo -- -h
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature               | How to exercise it                                                |
//! |-----------------------|-------------------------------------------------------------------|
//! | Defaults              | `cargo run --example optfig_demo -- --host a`                     |
//! | Short flags           | `cargo run --example optfig_demo -- --host a -p 9000 -r 3`        |
//! | Bare boolean flag     | `cargo run --example optfig_demo -- --host a --tls`               |
//! | Config file           | `cargo run --example optfig_demo -- --config demo.json`           |
//! | Missing required flag | `cargo run --example optfig_demo --` (aborts with the parse log)  |
//! | Help                  | `cargo run --example optfig_demo -- -h`                           |
//! | Save configuration    | `cargo run --example optfig_demo -- --host a --save out.toml`     |

use std::path::Path;
use std::process::ExitCode;

use optfig::{Config, FileFormat, LogLevel, OptfigError};

fn build() -> Config {
    let mut config = Config::new();
    config
        .description("optfig demo: resolve server settings from flags and files")
        .log_level(LogLevel::Warning);
    config
        .option("host")
        .shortflag("H")
        .description("Server host name")
        .required(true);
    config
        .option("server.port")
        .shortflag("p")
        .description("Listening port")
        .default_value(8000);
    config
        .option("retry.backoff")
        .shortflag("b")
        .description("Seconds between retries")
        .default_value(1.5);
    config
        .option("retries")
        .shortflag("r")
        .description("Retry attempts")
        .default_value(0);
    config
        .option("tls")
        .shortflag("t")
        .description("Enable TLS")
        .default_value(false);
    config
        .option("save")
        .shortflag("s")
        .description("Write the resolved configuration to this path")
        .default_value("");
    config
}

fn run() -> Result<(), OptfigError> {
    let mut config = build();
    config.parse(std::env::args())?;
    config.print_table();

    let port = config
        .get("server.port")
        .map(|v| v.as_int())
        .transpose()?
        .unwrap_or_default();
    let tls = config
        .get("tls")
        .map(|v| v.as_bool())
        .transpose()?
        .unwrap_or_default();
    println!(
        "would listen on port {port} ({})",
        if tls { "tls" } else { "plain" }
    );

    let save = config
        .get("save")
        .map(|v| v.as_text().map(str::to_string))
        .transpose()?
        .unwrap_or_default();
    if !save.is_empty() {
        let path = Path::new(&save);
        config.serialize(Some(path), FileFormat::default(), true)?;
        println!("saved to {}", path.display());
    }

    if !config.log_entries().is_empty() {
        config.write_log();
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
