//! Command handlers -- one module per subcommand

pub mod config;
pub mod report;
pub mod status;

use std::path::Path;

use deceptinet_core::config::DeceptinetConfig;

use crate::cli::Cli;
use crate::error::CliError;

/// Load the effective configuration for this invocation.
///
/// An explicit `--config` must exist; the implicit default file may be
/// absent, in which case built-in defaults are used. Global CLI flags are
/// applied last and the result is validated again.
pub async fn load_config(cli: &Cli) -> Result<DeceptinetConfig, CliError> {
    let (path, explicit) = cli.config_path();
    let mut config = if explicit {
        DeceptinetConfig::load(&path).await?
    } else {
        DeceptinetConfig::load_or_default(&path).await?
    };

    if let Some(log_dir) = &cli.log_dir {
        config.report.log_dir = log_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.general.log_level = level.clone();
    }
    config.validate()?;

    Ok(config)
}

/// Human-readable origin of the loaded configuration.
pub fn config_source_label(path: &Path, explicit: bool) -> String {
    if explicit || path.exists() {
        path.display().to_string()
    } else {
        "built-in defaults".to_owned()
    }
}
