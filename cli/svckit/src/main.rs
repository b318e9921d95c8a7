// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! svckit - Service Toolkit
//!
//! Command-line front end for the svckit library.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use svckit::config::{Config, ConfigFile};
use svckit::csv::{self, CsvError};
use svckit::{cron, emoji, hash, lscolors, prefixed, procname, sdnotify, uuid};
use tracing_subscriber::EnvFilter;

/// Service Toolkit
#[derive(Parser, Debug)]
#[command(name = "svckit")]
#[command(about = "Service Toolkit", long_about = None)]
struct Args {
    /// Config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a UUID
    Uuid {
        /// Namespace for a name-based (v5) UUID
        #[arg(long, requires = "name")]
        namespace: Option<Namespace>,

        /// Name for a name-based (v5) UUID
        #[arg(long, requires = "namespace")]
        name: Option<String>,
    },

    /// Encode or decode prefixed UUIDs
    Prefixed {
        #[command(subcommand)]
        command: PrefixedCommands,
    },

    /// Print SHA-256 of files
    Hash {
        /// Files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Map a key to a bucket with jump consistent hash
    Jump {
        /// Key
        key: u64,

        /// Number of buckets
        buckets: i32,
    },

    /// Colorize file names using LS_COLORS
    Color {
        /// File names or paths
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Print records of a delimited file
    Csv {
        /// Input file
        file: PathBuf,

        /// Field delimiter
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Replace :alias: with emoji, or search aliases
    Emoji {
        /// Text to emojize
        #[arg(required_unless_present = "find")]
        text: Option<String>,

        /// Search aliases containing this text
        #[arg(long)]
        find: Option<String>,
    },

    /// Validate a cron expression
    Cron {
        /// Expression
        expr: String,
    },

    /// Send a notification to the service manager
    Notify {
        #[command(subcommand)]
        command: NotifyCommands,
    },

    /// Load the config and validate its schedules
    CheckConfig,

    /// Rewrite this process's name as shown by ps
    Title {
        /// New name
        name: String,

        /// Seconds to keep running after the rewrite
        #[arg(long, default_value_t = 0)]
        hold: u64,
    },
}

#[derive(Subcommand, Debug)]
enum PrefixedCommands {
    /// Encode a UUID (random if omitted)
    Encode {
        prefix: String,
        uuid: Option<uuid::Uuid>,
    },

    /// Decode a prefixed UUID
    Decode { data: String },
}

#[derive(Subcommand, Debug)]
enum NotifyCommands {
    /// READY=1
    Ready,
    /// RELOADING=1
    Reloading,
    /// STOPPING=1
    Stopping,
    /// STATUS=<text>
    Status { text: String },
    /// Send a message verbatim
    Raw { msg: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Namespace {
    Dns,
    Url,
    Oid,
    X500,
}

impl Namespace {
    fn uuid(self) -> &'static uuid::Uuid {
        match self {
            Namespace::Dns => &uuid::NS_DNS,
            Namespace::Url => &uuid::NS_URL,
            Namespace::Oid => &uuid::NS_OID,
            Namespace::X500 => &uuid::NS_X500,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    config.validate().context("invalid schedules in config")?;
    Ok(config)
}

fn print_csv(file: &Path, delimiter: char) -> Result<()> {
    let input = File::open(file).with_context(|| format!("failed to open {}", file.display()))?;
    let mut reader = csv::Reader::with_delimiter(BufReader::new(input), delimiter);

    loop {
        match reader.read() {
            Ok(record) => println!("{}", record.join(" | ")),
            Err(CsvError::EndOfInput) => break,
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", file.display())),
        }
    }

    Ok(())
}

fn notify(command: NotifyCommands) -> Result<()> {
    sdnotify::connect().context("failed to connect to service manager")?;

    let sent = match command {
        NotifyCommands::Ready => sdnotify::ready(),
        NotifyCommands::Reloading => sdnotify::reloading(),
        NotifyCommands::Stopping => sdnotify::stopping(),
        NotifyCommands::Status { text } => sdnotify::status(format_args!("STATUS={}", text)),
        NotifyCommands::Raw { msg } => sdnotify::notify(&msg),
    };

    sent.context("failed to send notification")
}

fn set_title(name: &str, hold: u64) -> Result<()> {
    let current = procname::args()?;
    let first = current.first().context("process has no arguments")?;

    procname::replace(first, name)?;
    log::debug!("process title set to {:?}", name);
    println!("{}", procname::args()?.join(" "));

    if hold > 0 {
        std::thread::sleep(Duration::from_secs(hold));
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(args)
}

fn run(args: Args) -> Result<()> {
    let config_path = args.config.as_deref();

    match args.command {
        Commands::Uuid { namespace, name } => match (namespace, name) {
            (Some(ns), Some(name)) => println!("{}", uuid::gen_uuid5(ns.uuid(), &name)),
            _ => println!("{}", uuid::gen_uuid4()),
        },
        Commands::Prefixed { command } => match command {
            PrefixedCommands::Encode { prefix, uuid: id } => {
                let id = id.unwrap_or_else(uuid::Uuid::new_v4);
                let encoded = prefixed::encode(&prefix, &id);
                if encoded.is_empty() {
                    anyhow::bail!("prefix must be non-empty and UUID must not be nil");
                }
                println!("{}", encoded);
            }
            PrefixedCommands::Decode { data } => {
                let id = prefixed::decode(&data)?;
                println!("{} {}", id.prefix, id.uuid);
            }
        },
        Commands::Hash { files } => {
            for file in &files {
                let digest = hash::file_hash(file);
                if digest.is_empty() {
                    tracing::warn!("can't read {}", file.display());
                    continue;
                }
                println!("{}  {}", digest, file.display());
            }
        }
        Commands::Jump { key, buckets } => {
            println!("{}", hash::jump_hash(key, buckets));
        }
        Commands::Color { names } => {
            let config = load_config(config_path)?;
            let disabled = svckit::LsColors::disabled();
            let colors = if config.colors.enabled { lscolors::default_colors() } else { &disabled };
            for name in &names {
                println!("{}", colors.colorize_path(name));
            }
        }
        Commands::Csv { file, delimiter } => {
            let delimiter = match delimiter {
                Some(delimiter) => delimiter,
                None => load_config(config_path)?.csv.delimiter,
            };
            print_csv(&file, delimiter)?;
        }
        Commands::Emoji { text, find } => {
            if let Some(substr) = find {
                for alias in emoji::find(&substr) {
                    println!("{} :{}:", emoji::get(alias), alias);
                }
            }
            if let Some(text) = text {
                println!("{}", emoji::emojize(&text));
            }
        }
        Commands::Cron { expr } => {
            cron::parse(&expr).with_context(|| format!("invalid cron expression {:?}", expr))?;
            println!("ok");
        }
        Commands::Notify { command } => notify(command)?,
        Commands::CheckConfig => {
            let config = load_config(config_path)?;
            println!("{} schedules ok", config.schedules.len());
        }
        Commands::Title { name, hold } => set_title(&name, hold)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broken_config() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("svckit.json");
        std::fs::write(&path, "{not json").unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn test_config_not_needed() {
        let (_dir, path) = broken_config();

        let args = Args::parse_from(["svckit", "--config", path.as_str(), "jump", "128", "1024"]);
        assert!(run(args).is_ok());

        let args = Args::parse_from(["svckit", "--config", path.as_str(), "uuid"]);
        assert!(run(args).is_ok());
    }

    #[test]
    fn test_config_needed() {
        let (_dir, path) = broken_config();

        let args = Args::parse_from(["svckit", "--config", path.as_str(), "check-config"]);
        let err = run(args).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse config"));
    }
}
