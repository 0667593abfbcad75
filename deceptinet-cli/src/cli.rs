//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Configuration file looked up when `--config` is not given.
///
/// Unlike an explicit `--config`, a missing default file is not an error:
/// the built-in defaults cover the three stock decoys.
pub const DEFAULT_CONFIG_PATH: &str = "deceptinet.toml";

/// DeceptiNet -- honeypot log analyzer.
///
/// Runs the full report when no subcommand is given.
/// Use `deceptinet <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "deceptinet", version, about, long_about = None)]
pub struct Cli {
    /// Path to the deceptinet.toml configuration file [default: deceptinet.toml].
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Override the honeypot log root directory.
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Config path to load and whether the user asked for it explicitly.
    pub fn config_path(&self) -> (PathBuf, bool) {
        match &self.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze every configured honeypot and print the full report (default).
    Report(ReportArgs),

    /// Show which honeypots have logs on disk, without parsing them.
    Status,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- report ----

/// Analyze honeypot logs.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Override the number of top entries listed per dimension.
    #[arg(long)]
    pub top: Option<usize>,

    /// Only analyze the named source (repeatable, case-insensitive).
    #[arg(long = "source", value_name = "NAME")]
    pub sources: Vec<String>,
}

// ---- config ----

/// Manage deceptinet configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, report, sources).
        #[arg(long)]
        section: Option<String>,
    },
}
