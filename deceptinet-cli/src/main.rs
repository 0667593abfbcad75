//! deceptinet -- honeypot log analyzer CLI
//!
//! Reads the logs of every configured decoy (web login, SSH session,
//! malware capture), aggregates attacker activity and prints one report.
//! Logs go to stderr; stdout carries only the report.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use clap::Parser;
use colored::Colorize;

use deceptinet_core::config::GeneralConfig;

use crate::cli::{Cli, Commands, ReportArgs};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let command = cli
        .command
        .take()
        .unwrap_or_else(|| Commands::Report(ReportArgs::default()));

    deceptinet_core::metrics::describe_all();

    match command {
        Commands::Report(args) => {
            let config = commands::load_config(&cli).await?;
            init_logging(&config.general);
            commands::report::execute(args, config, &writer).await
        }
        Commands::Status => {
            let config = commands::load_config(&cli).await?;
            init_logging(&config.general);
            commands::status::execute(config, &writer).await
        }
        Commands::Config(args) => {
            // The config under inspection may itself be broken.
            let mut general = GeneralConfig::default();
            if let Some(level) = &cli.log_level {
                general.log_level = level.clone();
            }
            init_logging(&general);
            commands::config::execute(args, &cli, &writer).await
        }
    }
}

/// Logging is best-effort; a subscriber failure must not block the report.
fn init_logging(general: &GeneralConfig) {
    if let Err(e) = logging::init_tracing(general) {
        eprintln!("{} {:#}", "warning:".yellow().bold(), e);
    }
}
