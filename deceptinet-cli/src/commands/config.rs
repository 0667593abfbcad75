//! `deceptinet config` command handler

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use deceptinet_core::config::{DeceptinetConfig, SourceConfig};

use crate::cli::{Cli, ConfigAction, ConfigArgs};
use crate::commands::{config_source_label, load_config};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
const SECTIONS: &[&str] = &["general", "report", "sources"];

/// Execute the `config` command.
pub async fn execute(args: ConfigArgs, cli: &Cli, writer: &OutputWriter) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(cli, writer).await,
        ConfigAction::Show { section } => execute_show(cli, section, writer).await,
    }
}

/// Load and validate the configuration, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` after rendering the report if validation fails.
async fn execute_validate(cli: &Cli, writer: &OutputWriter) -> Result<(), CliError> {
    let (path, explicit) = cli.config_path();
    let source = config_source_label(&path, explicit);
    info!(source = %source, "validating configuration");

    let report = match load_config(cli).await {
        Ok(config) => ConfigValidationReport {
            source,
            valid: true,
            sources: config.sources.iter().filter(|s| s.enabled).count(),
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source,
            valid: false,
            sources: 0,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Display the effective configuration (file + env overrides + CLI flags + defaults).
///
/// # Errors
///
/// Returns the load error if the configuration is invalid, or
/// `CliError::Command` if the section name is unknown.
async fn execute_show(
    cli: &Cli,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let (path, explicit) = cli.config_path();
    let config = load_config(cli).await?;

    let report = ConfigReport {
        source: config_source_label(&path, explicit),
        config_toml: section_toml(&config, section.as_deref())?,
        section,
    };

    writer.render(&report)?;

    Ok(())
}

#[derive(Serialize)]
struct SourcesSection<'a> {
    sources: &'a [SourceConfig],
}

/// Serialize the whole configuration or a single section to TOML.
fn section_toml(config: &DeceptinetConfig, section: Option<&str>) -> Result<String, CliError> {
    let rendered = match section {
        None => toml::to_string_pretty(config),
        Some("general") => toml::to_string_pretty(&config.general),
        Some("report") => toml::to_string_pretty(&config.report),
        Some("sources") => toml::to_string_pretty(&SourcesSection {
            sources: &config.sources,
        }),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section: {} (expected: {})",
                other,
                SECTIONS.join(", ")
            )));
        }
    };

    Ok(rendered.unwrap_or_else(|e| format!("(serialization error: {})", e)))
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration origin (file path or built-in defaults)
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration origin (file path or built-in defaults)
    pub source: String,
    pub valid: bool,
    /// Number of enabled log sources
    pub sources: usize,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            writeln!(w, "  Enabled sources: {}", self.sources)?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
