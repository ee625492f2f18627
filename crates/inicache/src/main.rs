//! inicache command-line front end.
//!
//! Reads and writes one INI file through the same [`Settings`] store that
//! library users get, so the CLI follows the same parsing, staleness, and
//! rewrite rules.
//!
//! # Usage
//!
//! ```text
//! inicache --file <PATH> <COMMAND>
//!
//! Commands:
//!   get <KEY> [--default <TEXT>] [--type <TYPE>]   Print a value
//!   set <KEY> <VALUE> [--type <TYPE>]              Store a value
//!   dump                                           Print the raw file
//!   export [--pretty]                              Print the table as JSON
//!
//! TYPE is one of: string (default), int, float, double, bool
//! ```
//!
//! # Environment variables
//!
//! | Variable        | Description                               |
//! |-----------------|-------------------------------------------|
//! | `INICACHE_FILE` | Backing file, used when `--file` is absent |
//! | `RUST_LOG`      | Log filter (default `warn`), to stderr    |

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inicache::{FromIni, Settings, Value, ValueKind};
use inicache_core::{decode_value, IniTable};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Typed access to an INI configuration file.
#[derive(Debug, Parser)]
#[command(name = "inicache", version, about)]
struct Cli {
    /// INI file to operate on.
    #[arg(short, long, env = "INICACHE_FILE")]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the value stored under KEY (`section.key`).
    Get {
        key: String,
        /// Value printed when the key or file is absent.
        #[arg(long, default_value = "")]
        default: String,
        /// string, int, float, double or bool.
        #[arg(long = "type", default_value_t = ValueKind::String)]
        kind: ValueKind,
    },
    /// Store VALUE under KEY (`section.key`), creating the file if needed.
    Set {
        key: String,
        value: String,
        /// string, int, float, double or bool.
        #[arg(long = "type", default_value_t = ValueKind::String)]
        kind: ValueKind,
    },
    /// Print the raw lines of the file.
    Dump,
    /// Print the parsed table as a JSON object.
    Export {
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Serialize)]
struct Export<'a> {
    path: &'a Path,
    entries: IniTable,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::instance(&cli.file);
    debug!("using {}", settings.full_path().display());

    match cli.command {
        Command::Get { key, default, kind } => {
            let text = match kind {
                ValueKind::String => get_typed::<String>(&settings, &key, &default)?,
                ValueKind::Int => get_typed::<i32>(&settings, &key, &default)?,
                ValueKind::Float => get_typed::<f32>(&settings, &key, &default)?,
                ValueKind::Double => get_typed::<f64>(&settings, &key, &default)?,
                ValueKind::Bool => get_typed::<bool>(&settings, &key, &default)?,
            };
            println!("{text}");
        }
        Command::Set { key, value, kind } => {
            let value = Value::parse(kind, &value)
                .with_context(|| format!("invalid value for {key}"))?;
            settings
                .set_value(&key, value)
                .with_context(|| format!("failed to set {key}"))?;
        }
        Command::Dump => {
            settings.dump_file();
        }
        Command::Export { pretty } => {
            let export = Export {
                path: settings.full_path(),
                entries: settings.snapshot()?,
            };
            let json = if pretty {
                serde_json::to_string_pretty(&export)?
            } else {
                serde_json::to_string(&export)?
            };
            println!("{json}");
        }
    }
    Ok(())
}

/// Reads `key` as `T`, parsing the textual default with the same rules as
/// stored values.
fn get_typed<T>(settings: &Settings, key: &str, default: &str) -> Result<String>
where
    T: FromIni + Default + Display,
{
    let default: T = decode_value(default, T::default())
        .with_context(|| format!("invalid --default for type {}", T::KIND))?;
    let value = settings
        .get_value(key, default)
        .with_context(|| format!("failed to get {key} as {}", T::KIND))?;
    Ok(value.to_string())
}
